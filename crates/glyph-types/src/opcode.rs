//! The instruction set table.
//!
//! Every instruction is a single Unicode scalar value in the private-use
//! range starting at U+E000. The range is split into six category bands of
//! 256 slots plus one extensions band. Inside a band, each category owns a
//! 32-slot sub-range. Code points inside a band that have no assigned
//! instruction are reserved: looking them up fails, they are never treated
//! as ordinary symbol text.
//!
//! Each instruction also has a textual alias (`+`, `lambda`, `anomalous`)
//! that the parser maps to the same [`Opcode`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// First code point of the reserved instruction range.
pub const RESERVED_START: u32 = 0xE000;
/// Last code point of the reserved instruction range (end of the extensions band).
pub const RESERVED_END: u32 = 0xE6FF;
/// Slots per band.
pub const BAND_WIDTH: u32 = 0x100;

/// A code point inside a band with no assigned instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown instruction U+{:04X}", code_point(.0))]
pub struct UnknownInstruction(pub char);

fn code_point(c: &char) -> u32 {
    *c as u32
}

// ══════════════════════════════════════════════════════════════════════════════
// Bands & categories
// ══════════════════════════════════════════════════════════════════════════════

/// One of the seven 256-slot bands of the reserved range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Core,
    Motion,
    Classifier,
    Excitation,
    PhaseModel,
    Escalation,
    Extension,
}

impl Band {
    /// Band containing `cp`, or `None` when `cp` is outside the reserved range.
    pub const fn of(cp: u32) -> Option<Band> {
        if cp < RESERVED_START || cp > RESERVED_END {
            return None;
        }
        Some(match (cp - RESERVED_START) / BAND_WIDTH {
            0 => Band::Core,
            1 => Band::Motion,
            2 => Band::Classifier,
            3 => Band::Excitation,
            4 => Band::PhaseModel,
            5 => Band::Escalation,
            _ => Band::Extension,
        })
    }

    /// The code points covered by this band.
    pub const fn range(self) -> RangeInclusive<u32> {
        let index = match self {
            Band::Core => 0,
            Band::Motion => 1,
            Band::Classifier => 2,
            Band::Excitation => 3,
            Band::PhaseModel => 4,
            Band::Escalation => 5,
            Band::Extension => 6,
        };
        let start = RESERVED_START + index * BAND_WIDTH;
        start..=start + BAND_WIDTH - 1
    }
}

/// Operation category. Each category owns a contiguous 32-slot sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Arithmetic,
    Comparison,
    Logic,
    List,
    Control,
    Constant,
    Trig,
    Axis,
    Rate,
    State,
    Ema,
    Hawkes,
    PhaseModel,
    Tier,
}

impl Category {
    /// The code points reserved for this category.
    pub const fn range(self) -> RangeInclusive<u32> {
        let start = match self {
            Category::Arithmetic => 0xE000,
            Category::Comparison => 0xE020,
            Category::Logic => 0xE040,
            Category::List => 0xE060,
            Category::Control => 0xE080,
            Category::Constant => 0xE0A0,
            Category::Trig => 0xE0C0,
            Category::Axis => 0xE100,
            Category::Rate => 0xE120,
            Category::State => 0xE200,
            Category::Ema => 0xE220,
            Category::Hawkes => 0xE300,
            // Phase model and kill chain share the phase-model band.
            Category::PhaseModel => return 0xE400..=0xE43F,
            Category::Tier => 0xE500,
        };
        start..=start + 0x1F
    }

    /// Band this category lives in.
    pub const fn band(self) -> Band {
        match Band::of(*self.range().start()) {
            Some(band) => band,
            None => Band::Extension,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Opcode table
// ══════════════════════════════════════════════════════════════════════════════

macro_rules! instruction_set {
    ($( $(#[$doc:meta])* $variant:ident = $ch:literal, $name:literal, $cat:ident; )*) => {
        /// A defined instruction.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Opcode {
            $( $(#[$doc])* $variant, )*
        }

        impl Opcode {
            /// Every defined instruction, in code point order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$variant, )* ];

            /// The instruction literal for this opcode.
            pub const fn as_char(self) -> char {
                match self { $( Opcode::$variant => $ch, )* }
            }

            /// The textual alias for this opcode.
            pub const fn name(self) -> &'static str {
                match self { $( Opcode::$variant => $name, )* }
            }

            pub const fn category(self) -> Category {
                match self { $( Opcode::$variant => Category::$cat, )* }
            }

            fn lookup(c: char) -> Option<Opcode> {
                match c {
                    $( $ch => Some(Opcode::$variant), )*
                    _ => None,
                }
            }

            /// Resolve a textual alias such as `+` or `hawkes-spike`.
            pub fn from_name(name: &str) -> Option<Opcode> {
                match name {
                    $( $name => Some(Opcode::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

instruction_set! {
    // ── Arithmetic ──
    Add = '\u{E000}', "+", Arithmetic;
    Sub = '\u{E001}', "-", Arithmetic;
    Mul = '\u{E002}', "*", Arithmetic;
    Div = '\u{E003}', "/", Arithmetic;
    Mod = '\u{E004}', "%", Arithmetic;
    Abs = '\u{E005}', "abs", Arithmetic;
    Min = '\u{E006}', "min", Arithmetic;
    Max = '\u{E007}', "max", Arithmetic;
    Sqrt = '\u{E008}', "sqrt", Arithmetic;
    Pow = '\u{E009}', "pow", Arithmetic;

    // ── Comparison ──
    Eq = '\u{E020}', "=", Comparison;
    Ne = '\u{E021}', "!=", Comparison;
    Lt = '\u{E022}', "<", Comparison;
    Le = '\u{E023}', "<=", Comparison;
    Gt = '\u{E024}', ">", Comparison;
    Ge = '\u{E025}', ">=", Comparison;

    // ── Logic ──
    And = '\u{E040}', "and", Logic;
    Or = '\u{E041}', "or", Logic;
    Not = '\u{E042}', "not", Logic;

    // ── List operations ──
    List = '\u{E060}', "list", List;
    Cons = '\u{E061}', "cons", List;
    Head = '\u{E062}', "head", List;
    Tail = '\u{E063}', "tail", List;
    Len = '\u{E064}', "len", List;
    Nth = '\u{E065}', "nth", List;
    IsEmpty = '\u{E066}', "empty?", List;

    // ── Control forms ──
    If = '\u{E080}', "if", Control;
    Cond = '\u{E081}', "cond", Control;
    Let = '\u{E082}', "let", Control;
    Lambda = '\u{E083}', "lambda", Control;
    Apply = '\u{E084}', "apply", Control;
    Quote = '\u{E085}', "quote", Control;
    Define = '\u{E086}', "define", Control;
    Begin = '\u{E087}', "begin", Control;

    // ── Named constants ──
    Nil = '\u{E0A0}', "nil", Constant;
    True = '\u{E0A1}', "true", Constant;
    False = '\u{E0A2}', "false", Constant;
    Pi = '\u{E0A3}', "pi", Constant;
    Tau = '\u{E0A4}', "tau", Constant;
    Euler = '\u{E0A5}', "e", Constant;

    // ── Trigonometry ──
    Sin = '\u{E0C0}', "sin", Trig;
    Cos = '\u{E0C1}', "cos", Trig;
    Tan = '\u{E0C2}', "tan", Trig;
    Asin = '\u{E0C3}', "asin", Trig;
    Acos = '\u{E0C4}', "acos", Trig;
    Atan = '\u{E0C5}', "atan", Trig;
    Atan2 = '\u{E0C6}', "atan2", Trig;
    /// Degrees to radians.
    Rad = '\u{E0C7}', "rad", Trig;
    /// Radians to degrees.
    Deg = '\u{E0C8}', "deg", Trig;

    // ── Per-axis motion ──
    AxisSet = '\u{E100}', "axis-set", Axis;
    AxisDelta = '\u{E101}', "axis-delta", Axis;
    AxisGet = '\u{E102}', "axis-get", Axis;
    SetX = '\u{E103}', "set-x", Axis;
    SetY = '\u{E104}', "set-y", Axis;
    SetZ = '\u{E105}', "set-z", Axis;
    DeltaX = '\u{E106}', "delta-x", Axis;
    DeltaY = '\u{E107}', "delta-y", Axis;
    DeltaZ = '\u{E108}', "delta-z", Axis;
    GetX = '\u{E109}', "get-x", Axis;
    GetY = '\u{E10A}', "get-y", Axis;
    GetZ = '\u{E10B}', "get-z", Axis;

    // ── Rate calculations ──
    /// Euclidean norm of the three pending per-axis deltas.
    Rate = '\u{E120}', "rate", Rate;
    /// Rate divided by elapsed seconds.
    RatePer = '\u{E121}', "rate-per", Rate;
    Norm = '\u{E122}', "norm", Rate;

    // ── Discrete state classifiers ──
    Stable = '\u{E200}', "stable", State;
    Drift = '\u{E201}', "drift", State;
    Anomalous = '\u{E202}', "anomalous", State;
    RateExceeded = '\u{E203}', "rate-exceeded", State;
    /// Convergence crisis.
    Crisis = '\u{E204}', "crisis", State;
    Converged = '\u{E205}', "converged", State;

    // ── Smoothed-signal (EMA) classifiers ──
    EmaLow = '\u{E220}', "ema-low", Ema;
    EmaRising = '\u{E221}', "ema-rising", Ema;
    EmaFalling = '\u{E222}', "ema-falling", Ema;
    EmaHigh = '\u{E223}', "ema-high", Ema;
    /// High sustained intensity.
    EmaSustained = '\u{E224}', "ema-sustained", Ema;

    // ── Self-exciting process classifiers ──
    HawkesQuiet = '\u{E300}', "hawkes-quiet", Hawkes;
    HawkesExcited = '\u{E301}', "hawkes-excited", Hawkes;
    HawkesSpike = '\u{E302}', "hawkes-spike", Hawkes;
    HawkesDecay = '\u{E303}', "hawkes-decay", Hawkes;

    // ── Phase model ──
    PhaseOnset = '\u{E400}', "phase-onset", PhaseModel;
    PhaseBuild = '\u{E401}', "phase-build", PhaseModel;
    PhasePeak = '\u{E402}', "phase-peak", PhaseModel;
    PhaseCascade = '\u{E403}', "phase-cascade", PhaseModel;

    // ── Kill chain ──
    KcRecon = '\u{E420}', "kc-recon", PhaseModel;
    KcWeaponize = '\u{E421}', "kc-weaponize", PhaseModel;
    KcDeliver = '\u{E422}', "kc-deliver", PhaseModel;
    KcExploit = '\u{E423}', "kc-exploit", PhaseModel;
    KcInstall = '\u{E424}', "kc-install", PhaseModel;
    KcCommand = '\u{E425}', "kc-command", PhaseModel;
    KcAct = '\u{E426}', "kc-act", PhaseModel;

    // ── Escalation tier ──
    Escalate = '\u{E500}', "escalate", Tier;
    Deescalate = '\u{E501}', "deescalate", Tier;
    /// Reads the current tier; not a trigger.
    TierRead = '\u{E502}', "tier", Tier;
}

impl Opcode {
    /// Resolve an instruction literal.
    ///
    /// Returns `Ok(None)` when `c` lies outside every band (it is ordinary
    /// symbol text) and `Err` when `c` is a reserved but unassigned slot.
    pub fn from_char(c: char) -> Result<Option<Opcode>, UnknownInstruction> {
        if !is_reserved(c) {
            return Ok(None);
        }
        Self::lookup(c).map(Some).ok_or(UnknownInstruction(c))
    }

    pub const fn code_point(self) -> u32 {
        self.as_char() as u32
    }

    pub const fn band(self) -> Band {
        self.category().band()
    }

    /// Forms whose arguments are not evaluated before dispatch.
    pub const fn is_special_form(self) -> bool {
        matches!(
            self,
            Opcode::If
                | Opcode::Cond
                | Opcode::Let
                | Opcode::Lambda
                | Opcode::Quote
                | Opcode::Define
                | Opcode::Begin
                | Opcode::And
                | Opcode::Or
        )
    }

    /// Instructions whose evaluation emits a Fire event.
    pub const fn is_trigger(self) -> bool {
        match self.category() {
            Category::State | Category::Ema | Category::Hawkes | Category::PhaseModel => true,
            Category::Tier => matches!(self, Opcode::Escalate | Opcode::Deescalate),
            _ => false,
        }
    }

    /// Triggers that force the tier up to the configured floor.
    pub const fn is_critical(self) -> bool {
        matches!(
            self,
            Opcode::Anomalous
                | Opcode::Crisis
                | Opcode::HawkesSpike
                | Opcode::PhasePeak
                | Opcode::PhaseCascade
                | Opcode::KcExploit
                | Opcode::KcInstall
                | Opcode::KcCommand
                | Opcode::KcAct
        )
    }

    /// Triggers that raise the tier by one step.
    pub const fn is_escalating(self) -> bool {
        self.is_critical()
            || matches!(
                self,
                Opcode::RateExceeded | Opcode::EmaHigh | Opcode::EmaSustained
            )
    }

    /// Tier triggers act on the escalation policy during evaluation itself.
    pub const fn is_tier_trigger(self) -> bool {
        matches!(self, Opcode::Escalate | Opcode::Deescalate)
    }
}

/// `true` if `c` lies inside any band of the reserved range.
pub const fn is_reserved(c: char) -> bool {
    Band::of(c as u32).is_some()
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Opcodes cross the host boundary by alias so sinks need no code point table.
impl Serialize for Opcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Opcode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Opcode::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown instruction '{name}'")))
    }
}
