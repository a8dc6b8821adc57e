use crate::Error;

/// What a completion callback receives once a future is terminal.
pub type Outcome<T> = Result<T, Error>;

/// Resolution state of a promise. Terminal once it leaves `Pending`.
#[derive(Debug, Clone)]
pub enum State<T> {
    Pending,
    Fulfilled(T),
    Rejected(Error),
}

impl<T> State<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, State::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, State::Rejected(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            State::Fulfilled(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            State::Rejected(error) => Some(error),
            _ => None,
        }
    }
}

impl<T: Clone> State<T> {
    /// The terminal outcome, or `None` while pending.
    pub fn outcome(&self) -> Option<Outcome<T>> {
        match self {
            State::Pending => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(error) => Some(Err(error.clone())),
        }
    }
}

impl<T> From<Outcome<T>> for State<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Ok(value) => State::Fulfilled(value),
            Err(error) => State::Rejected(error),
        }
    }
}
