use crate::ast::ComparisonOperator;

/// `#`-prefixed control constructs recognised by the template parser.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Directive {
    Set,
    If,
    ElseIf,
    Else,
    End,
}

impl Directive {
    /// Directives that only make sense inside an open `#if` block.
    pub fn continues_block(self) -> bool {
        matches!(self, Directive::ElseIf | Directive::Else | Directive::End)
    }
}

/// Spelled-out operator aliases usable inside expressions (`$a eq $b and not $c`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum WordOperator {
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl WordOperator {
    /// The comparison spelled by `eq`, `ne`, `lt`, `gt`, `le` or `ge`.
    pub fn comparison(self) -> Option<ComparisonOperator> {
        Some(match self {
            WordOperator::Eq => ComparisonOperator::Equal,
            WordOperator::Ne => ComparisonOperator::NotEqual,
            WordOperator::Lt => ComparisonOperator::Less,
            WordOperator::Gt => ComparisonOperator::Greater,
            WordOperator::Le => ComparisonOperator::LessEqual,
            WordOperator::Ge => ComparisonOperator::GreaterEqual,
            WordOperator::And | WordOperator::Or | WordOperator::Not => return None,
        })
    }
}
