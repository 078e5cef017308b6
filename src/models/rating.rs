//! Learner-supplied recall ratings.
use crate::error::StudyError;
use serde::{Deserialize, Serialize};

/// The four rating buttons. Discriminants are the SM-2 quality values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    /// Failed recall. The only rating that counts as a lapse.
    Again = 0,
    Hard = 3,
    Good = 4,
    Easy = 5,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn quality(self) -> u8 {
        self as u8
    }

    /// Hard, Good and Easy all count toward accuracy.
    pub fn is_correct(self) -> bool {
        self != Rating::Again
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = StudyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rating::Again),
            3 => Ok(Rating::Hard),
            4 => Ok(Rating::Good),
            5 => Ok(Rating::Easy),
            other => Err(StudyError::InvalidRating(other)),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.quality()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ratings() {
        for rating in Rating::ALL {
            assert_eq!(Rating::try_from(rating.quality()).unwrap(), rating);
        }
    }

    #[test]
    fn test_out_of_range_ratings_are_rejected() {
        for value in [1u8, 2, 6, 255] {
            assert!(matches!(
                Rating::try_from(value),
                Err(StudyError::InvalidRating(v)) if v == value
            ));
        }
    }

    #[test]
    fn test_only_again_is_incorrect() {
        assert!(!Rating::Again.is_correct());
        assert!(Rating::Hard.is_correct());
        assert!(Rating::Good.is_correct());
        assert!(Rating::Easy.is_correct());
    }
}
