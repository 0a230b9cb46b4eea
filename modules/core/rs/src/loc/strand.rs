use std::fmt::Display;
use std::str::FromStr;

use eyre::{eyre, Report};

/// Strand of the reference genome a target site or a gene is read from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(i8)]
pub enum Strand {
    /// The forward strand, also known as the positive or plus strand.
    Forward = 1,
    /// The reverse strand, also known as the negative or minus strand.
    Reverse = -1,
}

impl Strand {
    /// Get the symbolic representation of the strand.
    pub fn symbol(&self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }

    /// Sign of the transcription direction in plus-strand coordinates: 1 for forward, -1 for reverse.
    pub fn sign(&self) -> i64 {
        *self as i8 as i64
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Strand {
    type Error = Report;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Self::Forward),
            '-' => Ok(Self::Reverse),
            _ => Err(eyre!("Unknown strand symbol: '{value}'")),
        }
    }
}

impl TryFrom<&str> for Strand {
    type Error = Report;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "+" | "1" | "+1" => Ok(Self::Forward),
            "-" | "-1" => Ok(Self::Reverse),
            other => Err(eyre!("Unknown strand symbol: '{other}'")),
        }
    }
}

impl FromStr for Strand {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl TryFrom<i8> for Strand {
    type Error = Report;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Reverse),
            _ => Err(eyre!("Unknown strand value: {value}")),
        }
    }
}

impl Default for Strand {
    fn default() -> Self {
        Self::Forward
    }
}
