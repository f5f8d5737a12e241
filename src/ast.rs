use core::fmt;

// Root of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub label: String,
    pub nodes: Vec<Node>,
}

impl Template {
    pub fn new(label: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            label: label.into(),
            nodes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Reference(Reference),
    Set(SetDirective),
    If(IfDirective),
}

/// `#set($target = value)`
#[derive(Debug, Clone, PartialEq)]
pub struct SetDirective {
    pub target: String,
    pub value: Expression,
}

/// `#if` with any number of `#elseif` branches and an optional `#else`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfDirective {
    pub branches: Vec<ConditionalBranch>,
    pub otherwise: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    pub condition: Expression,
    pub body: Vec<Node>,
}

// $name, $!name, ${name.member(...)}
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub quiet: bool,
    pub root: String,
    pub path: Vec<Accessor>,
    /// Source text of the reference, rendered verbatim when it resolves to nothing.
    pub literal: String,
}

impl Reference {
    pub fn variable(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            quiet: false,
            literal: format!("${root}"),
            root,
            path: Vec::new(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    Property(String),
    Method {
        name: String,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Reference(Reference),
    /// Double-quoted string, rendered as a template each time it is evaluated.
    Interpolated(Vec<Node>),
    Map(MapLiteral),
    List(Vec<Expression>),
    Arithmetic {
        op: ArithmeticOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Comparison {
        op: ComparisonOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Logical {
        op: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    Negate(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i32),
    Long(i64),
    Double(f64),
    String(String),
    Boolean(bool),
    Null,
}

// %{ key = value, ... }
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapLiteral {
    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: MapValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapValue {
    /// Quoted value; may interpolate references.
    Text(Vec<Node>),
    Number(Literal),
    Boolean(bool),
    Reference {
        reference: Reference,
        /// Set by a trailing `.to_squote` / `.to_quote`.
        quote: Option<char>,
    },
    Map(MapLiteral),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum ArithmeticOperator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "%")]
    Modulo,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum ComparisonOperator {
    #[strum(to_string = "==", serialize = "eq")]
    Equal,
    #[strum(to_string = "!=", serialize = "ne")]
    NotEqual,
    #[strum(to_string = "<", serialize = "lt")]
    Less,
    #[strum(to_string = ">", serialize = "gt")]
    Greater,
    #[strum(to_string = "<=", serialize = "le")]
    LessEqual,
    #[strum(to_string = ">=", serialize = "ge")]
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum LogicalOperator {
    #[strum(to_string = "&&", serialize = "and")]
    And,
    #[strum(to_string = "||", serialize = "or")]
    Or,
}
