//! Enumeration types for the crossing controller.
//!
//! The controller sequences two approaches, the main road and the side road,
//! through nine signal states. Raw input lines are reduced to three input
//! classes before the core ever looks at them.

use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Signal states
// ---------------------------------------------------------------------------

/// The state register of the crossing controller.
///
/// Exactly one state is current at any tick. The controller powers up in
/// [`SignalState::MainRed`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    /// All-red clearance after the main approach's yellow.
    #[default]
    MainRed,
    /// First, steady half of the main green phase.
    MainGreen1,
    /// Closing half of the main green phase; side walk flashes.
    MainGreen2,
    /// Main green held longer because a vehicle is waiting on the sensor.
    MainGreenExtended,
    /// Main approach shows yellow.
    MainYellow,
    /// All-red clearance after the side approach's yellow.
    SideRed,
    /// First, steady half of the side green phase.
    SideGreen1,
    /// Closing half of the side green phase; main walk flashes.
    SideGreen2,
    /// Side approach shows yellow.
    SideYellow,
}

impl SignalState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::MainRed,
        Self::MainGreen1,
        Self::MainGreen2,
        Self::MainGreenExtended,
        Self::MainYellow,
        Self::SideRed,
        Self::SideGreen1,
        Self::SideGreen2,
        Self::SideYellow,
    ];

    /// Whether pedestrian indicators flash in this state.
    pub const fn is_blink_phase(self) -> bool {
        match self {
            Self::MainGreen2 | Self::MainYellow | Self::SideGreen2 | Self::SideYellow => true,
            Self::MainRed
            | Self::MainGreen1
            | Self::MainGreenExtended
            | Self::SideRed
            | Self::SideGreen1 => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Approaches
// ---------------------------------------------------------------------------

/// One of the two competing approaches at the crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    /// The main road.
    Main,
    /// The side road.
    Side,
}

impl Approach {
    /// The approach that competes with this one.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Main => Self::Side,
            Self::Side => Self::Main,
        }
    }

    /// The yellow state of this approach.
    pub const fn yellow_state(self) -> SignalState {
        match self {
            Self::Main => SignalState::MainYellow,
            Self::Side => SignalState::SideYellow,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Classified value of one input line for a single tick.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InputClass {
    /// Logic low: no call, no vehicle.
    #[default]
    Low,
    /// Logic high: call pressed or vehicle present.
    High,
    /// Undefined electrical condition; forces the fail-safe output.
    Unknown,
}

impl InputClass {
    /// Whether the line is asserted.
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// Whether the line is in an undefined condition.
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Electrical state of a raw input line before classification.
///
/// Covers driven and weak logic levels as well as the conditions a line can
/// be in when it is floating, contended, or not yet initialized.
///
/// Serializes as its `snake_case` name. Deserializes from either the name
/// or the single-character notation; `0` and `1` may also be given as
/// integers. `-` must be quoted in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineLevel {
    /// Never driven since power-up (`U`).
    Uninitialized,
    /// Two drivers disagree (`X`).
    Conflict,
    /// Driven low (`0`).
    Low,
    /// Driven high (`1`).
    High,
    /// Floating (`Z`).
    HighImpedance,
    /// Weak drivers disagree (`W`).
    WeakUnknown,
    /// Pulled low (`L`).
    WeakLow,
    /// Pulled high (`H`).
    WeakHigh,
    /// Unspecified (`-`).
    DontCare,
}

impl LineLevel {
    /// Reduce the line level to the three classes the controller reasons about.
    ///
    /// Driven and pulled levels keep their logic value; every other
    /// condition is [`InputClass::Unknown`].
    pub const fn classify(self) -> InputClass {
        match self {
            Self::Low | Self::WeakLow => InputClass::Low,
            Self::High | Self::WeakHigh => InputClass::High,
            Self::Uninitialized
            | Self::Conflict
            | Self::HighImpedance
            | Self::WeakUnknown
            | Self::DontCare => InputClass::Unknown,
        }
    }

    /// Parse the conventional single-character notation (`U X 0 1 Z W L H -`).
    ///
    /// Letters are accepted in either case.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'U' | 'u' => Some(Self::Uninitialized),
            'X' | 'x' => Some(Self::Conflict),
            '0' => Some(Self::Low),
            '1' => Some(Self::High),
            'Z' | 'z' => Some(Self::HighImpedance),
            'W' | 'w' => Some(Self::WeakUnknown),
            'L' | 'l' => Some(Self::WeakLow),
            'H' | 'h' => Some(Self::WeakHigh),
            '-' => Some(Self::DontCare),
            _ => None,
        }
    }

    /// Parse a level from its `snake_case` name or, for one-character
    /// input, from the single-character notation.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_char(c);
        }
        match name {
            "uninitialized" => Some(Self::Uninitialized),
            "conflict" => Some(Self::Conflict),
            "low" => Some(Self::Low),
            "high" => Some(Self::High),
            "high_impedance" => Some(Self::HighImpedance),
            "weak_unknown" => Some(Self::WeakUnknown),
            "weak_low" => Some(Self::WeakLow),
            "weak_high" => Some(Self::WeakHigh),
            "dont_care" => Some(Self::DontCare),
            _ => None,
        }
    }

    /// The single-character notation for this level.
    pub const fn as_char(self) -> char {
        match self {
            Self::Uninitialized => 'U',
            Self::Conflict => 'X',
            Self::Low => '0',
            Self::High => '1',
            Self::HighImpedance => 'Z',
            Self::WeakUnknown => 'W',
            Self::WeakLow => 'L',
            Self::WeakHigh => 'H',
            Self::DontCare => '-',
        }
    }
}

impl<'de> Deserialize<'de> for LineLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LineLevelVisitor)
    }
}

struct LineLevelVisitor;

impl Visitor<'_> for LineLevelVisitor {
    type Value = LineLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a line level name or one of U X 0 1 Z W L H -")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LineLevel, E> {
        LineLevel::from_name(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LineLevel, E> {
        match v {
            0 => Ok(LineLevel::Low),
            1 => Ok(LineLevel::High),
            _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LineLevel, E> {
        match v {
            0 => Ok(LineLevel::Low),
            1 => Ok(LineLevel::High),
            _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Aspect shown by one approach's vehicle signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightColor {
    /// Stop.
    Red,
    /// Prepare to stop.
    Yellow,
    /// Go.
    Green,
}
