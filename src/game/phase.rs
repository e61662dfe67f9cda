use crate::ShortName;
use std::borrow::Cow;
use std::fmt;

/// The game phase, cycling winter -> spring -> fall.
///
/// Winter is the adjustment phase (builds and disbands); spring and fall are
/// movement phases. Supply-center ownership updates when fall ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Winter,
    Spring,
    Fall,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Winter => Phase::Spring,
            Phase::Spring => Phase::Fall,
            Phase::Fall => Phase::Winter,
        }
    }
}

impl ShortName for Phase {
    fn short_name(&self) -> Cow<'_, str> {
        match self {
            Phase::Winter => Cow::Borrowed("W"),
            Phase::Spring => Cow::Borrowed("S"),
            Phase::Fall => Cow::Borrowed("F"),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Phase::Winter => write!(f, "winter"),
            Phase::Spring => write!(f, "spring"),
            Phase::Fall => write!(f, "fall"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Phase;

    #[test]
    fn cycles() {
        assert_eq!(Phase::Winter.next(), Phase::Spring);
        assert_eq!(Phase::Spring.next(), Phase::Fall);
        assert_eq!(Phase::Fall.next(), Phase::Winter);
    }
}
