use clap::ValueEnum;
use ease_parser::ProducerPolicy;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum PolicyFlag {
    /// The first constructor in declaration order wins
    First,
    /// Fail when more than one constructor returns the type
    Strict,
}

impl PolicyFlag {
    pub(crate) const fn as_domain(self) -> ProducerPolicy {
        match self {
            PolicyFlag::First => ProducerPolicy::FirstRegistered,
            PolicyFlag::Strict => ProducerPolicy::RejectAmbiguous,
        }
    }
}
