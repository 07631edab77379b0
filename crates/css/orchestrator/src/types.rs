/// Where a stylesheet came from; later origins win the cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Origin {
    UserAgent,
    User,
    #[default]
    Author,
}

impl Origin {
    /// Small integral weight for precedence comparisons.
    pub const fn weight(self) -> u8 {
        match self {
            Self::UserAgent => 0,
            Self::User => 1,
            Self::Author => 2,
        }
    }
}
