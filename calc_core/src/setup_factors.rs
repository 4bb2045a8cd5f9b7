//! # Setup Time Factors
//!
//! Static lookup tables for setup/changeover estimation.
//!
//! ## Overview
//!
//! Five categorical descriptors each map to a base time in minutes, and two
//! descriptors of the people doing the work map to multipliers:
//!
//! ```text
//! raw_total      = T_prog + T_load + T_prep + T_insp + T_fixture
//! adjusted_total = raw_total × clamp(M_operator × M_familiarity, 0.60, 2.00)
//! ```
//!
//! ## Time Tables (minutes)
//!
//! | Component     | Level 1      | Level 2        | Level 3          | Level 4            |
//! |---------------|--------------|----------------|------------------|--------------------|
//! | Programming   | Simple 15    | Moderate 30    | Complex 60       | Very complex 120   |
//! | Loading       | Small 5      | Medium 10      | Large 20         | Extra large 40     |
//! | Machine prep  | None 5       | Tool change 15 | Material change 30 | Full changeover 60 |
//! | Inspection    | Basic 5      | Standard 15    | Detailed 30      | First article 60   |
//! | Fixture       | None 0       | Simple 10      | Moderate 25      | Complex 45         |
//!
//! ## Multipliers
//!
//! | Factor      | Values                                                      |
//! |-------------|-------------------------------------------------------------|
//! | Operator    | Novice 1.50, Intermediate 1.20, Experienced 1.00, Expert 0.85 |
//! | Familiarity | First time 1.30, Occasional 1.10, Regular 1.00, Repeat 0.80   |

use serde::{Deserialize, Serialize};

/// Lower bound of the combined experience multiplier
pub const MIN_EXPERIENCE_MULTIPLIER: f64 = 0.60;

/// Upper bound of the combined experience multiplier
pub const MAX_EXPERIENCE_MULTIPLIER: f64 = 2.00;

/// CNC/laser programming effort for the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProgrammingComplexity {
    /// Existing program or simple profile: 15 min
    Simple,
    /// Some nesting or parameter edits: 30 min
    #[default]
    Moderate,
    /// New program with multiple features: 60 min
    Complex,
    /// Multi-op program, prove-out required: 120 min
    VeryComplex,
}

impl ProgrammingComplexity {
    /// All variants for UI selection
    pub const ALL: [ProgrammingComplexity; 4] = [
        ProgrammingComplexity::Simple,
        ProgrammingComplexity::Moderate,
        ProgrammingComplexity::Complex,
        ProgrammingComplexity::VeryComplex,
    ];

    /// Programming time in minutes
    pub fn minutes(&self) -> f64 {
        match self {
            ProgrammingComplexity::Simple => 15.0,
            ProgrammingComplexity::Moderate => 30.0,
            ProgrammingComplexity::Complex => 60.0,
            ProgrammingComplexity::VeryComplex => 120.0,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            ProgrammingComplexity::Simple => "Simple (15 min)",
            ProgrammingComplexity::Moderate => "Moderate (30 min)",
            ProgrammingComplexity::Complex => "Complex (60 min)",
            ProgrammingComplexity::VeryComplex => "Very complex (120 min)",
        }
    }
}

impl std::fmt::Display for ProgrammingComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Size/weight of the stock being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MaterialSize {
    /// Hand-loaded: 5 min
    Small,
    /// Two-hand or cart: 10 min
    #[default]
    Medium,
    /// Hoist or forklift: 20 min
    Large,
    /// Crane, multiple people: 40 min
    ExtraLarge,
}

impl MaterialSize {
    /// All variants for UI selection
    pub const ALL: [MaterialSize; 4] = [
        MaterialSize::Small,
        MaterialSize::Medium,
        MaterialSize::Large,
        MaterialSize::ExtraLarge,
    ];

    /// Loading time in minutes
    pub fn minutes(&self) -> f64 {
        match self {
            MaterialSize::Small => 5.0,
            MaterialSize::Medium => 10.0,
            MaterialSize::Large => 20.0,
            MaterialSize::ExtraLarge => 40.0,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialSize::Small => "Small (5 min)",
            MaterialSize::Medium => "Medium (10 min)",
            MaterialSize::Large => "Large (20 min)",
            MaterialSize::ExtraLarge => "Extra large (40 min)",
        }
    }
}

impl std::fmt::Display for MaterialSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What has to change on the machine since the previous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MachineChange {
    /// Same tooling and material, verification only: 5 min
    None,
    /// Tool, nozzle or lens swap: 15 min
    #[default]
    ToolChange,
    /// Different material or thickness, parameters re-set: 30 min
    MaterialChange,
    /// Full changeover of tooling, workholding and parameters: 60 min
    FullChangeover,
}

impl MachineChange {
    /// All variants for UI selection
    pub const ALL: [MachineChange; 4] = [
        MachineChange::None,
        MachineChange::ToolChange,
        MachineChange::MaterialChange,
        MachineChange::FullChangeover,
    ];

    /// Machine preparation time in minutes
    pub fn minutes(&self) -> f64 {
        match self {
            MachineChange::None => 5.0,
            MachineChange::ToolChange => 15.0,
            MachineChange::MaterialChange => 30.0,
            MachineChange::FullChangeover => 60.0,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            MachineChange::None => "No change (5 min)",
            MachineChange::ToolChange => "Tool change (15 min)",
            MachineChange::MaterialChange => "Material change (30 min)",
            MachineChange::FullChangeover => "Full changeover (60 min)",
        }
    }
}

impl std::fmt::Display for MachineChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Inspection required before the batch is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InspectionLevel {
    /// Visual check: 5 min
    Basic,
    /// Key dimensions measured: 15 min
    #[default]
    Standard,
    /// Full dimensional check: 30 min
    Detailed,
    /// Documented first-article inspection: 60 min
    FirstArticle,
}

impl InspectionLevel {
    /// All variants for UI selection
    pub const ALL: [InspectionLevel; 4] = [
        InspectionLevel::Basic,
        InspectionLevel::Standard,
        InspectionLevel::Detailed,
        InspectionLevel::FirstArticle,
    ];

    /// First-piece inspection time in minutes
    pub fn minutes(&self) -> f64 {
        match self {
            InspectionLevel::Basic => 5.0,
            InspectionLevel::Standard => 15.0,
            InspectionLevel::Detailed => 30.0,
            InspectionLevel::FirstArticle => 60.0,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            InspectionLevel::Basic => "Basic (5 min)",
            InspectionLevel::Standard => "Standard (15 min)",
            InspectionLevel::Detailed => "Detailed (30 min)",
            InspectionLevel::FirstArticle => "First article (60 min)",
        }
    }
}

impl std::fmt::Display for InspectionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Workholding/fixture effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FixtureComplexity {
    /// Bed or vise as-is: 0 min
    #[default]
    None,
    /// Stops or soft jaws: 10 min
    Simple,
    /// Dedicated fixture, some alignment: 25 min
    Moderate,
    /// Multi-part or custom fixture with indicating: 45 min
    Complex,
}

impl FixtureComplexity {
    /// All variants for UI selection
    pub const ALL: [FixtureComplexity; 4] = [
        FixtureComplexity::None,
        FixtureComplexity::Simple,
        FixtureComplexity::Moderate,
        FixtureComplexity::Complex,
    ];

    /// Fixture setup time in minutes
    pub fn minutes(&self) -> f64 {
        match self {
            FixtureComplexity::None => 0.0,
            FixtureComplexity::Simple => 10.0,
            FixtureComplexity::Moderate => 25.0,
            FixtureComplexity::Complex => 45.0,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            FixtureComplexity::None => "None (0 min)",
            FixtureComplexity::Simple => "Simple (10 min)",
            FixtureComplexity::Moderate => "Moderate (25 min)",
            FixtureComplexity::Complex => "Complex (45 min)",
        }
    }
}

impl std::fmt::Display for FixtureComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Skill level of the operator doing the setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OperatorExperience {
    /// Under 1 year: ×1.50
    Novice,
    /// 1-3 years: ×1.20
    Intermediate,
    /// 3-10 years: ×1.00
    #[default]
    Experienced,
    /// 10+ years: ×0.85
    Expert,
}

impl OperatorExperience {
    /// All variants, least to most experienced
    pub const ALL: [OperatorExperience; 4] = [
        OperatorExperience::Novice,
        OperatorExperience::Intermediate,
        OperatorExperience::Experienced,
        OperatorExperience::Expert,
    ];

    /// Time multiplier
    pub fn multiplier(&self) -> f64 {
        match self {
            OperatorExperience::Novice => 1.50,
            OperatorExperience::Intermediate => 1.20,
            OperatorExperience::Experienced => 1.00,
            OperatorExperience::Expert => 0.85,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            OperatorExperience::Novice => "Novice (×1.50)",
            OperatorExperience::Intermediate => "Intermediate (×1.20)",
            OperatorExperience::Experienced => "Experienced (×1.00)",
            OperatorExperience::Expert => "Expert (×0.85)",
        }
    }
}

impl std::fmt::Display for OperatorExperience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How often the shop has run this job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobFamiliarity {
    /// Never run before: ×1.30
    FirstTime,
    /// Run a few times: ×1.10
    Occasional,
    /// Run regularly: ×1.00
    #[default]
    Regular,
    /// Repeat order, setup sheet on file: ×0.80
    Repeat,
}

impl JobFamiliarity {
    /// All variants, least to most familiar
    pub const ALL: [JobFamiliarity; 4] = [
        JobFamiliarity::FirstTime,
        JobFamiliarity::Occasional,
        JobFamiliarity::Regular,
        JobFamiliarity::Repeat,
    ];

    /// Time multiplier
    pub fn multiplier(&self) -> f64 {
        match self {
            JobFamiliarity::FirstTime => 1.30,
            JobFamiliarity::Occasional => 1.10,
            JobFamiliarity::Regular => 1.00,
            JobFamiliarity::Repeat => 0.80,
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            JobFamiliarity::FirstTime => "First time (×1.30)",
            JobFamiliarity::Occasional => "Occasional (×1.10)",
            JobFamiliarity::Regular => "Regular (×1.00)",
            JobFamiliarity::Repeat => "Repeat (×0.80)",
        }
    }
}

impl std::fmt::Display for JobFamiliarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Combined experience multiplier: product of the operator and familiarity
/// multipliers, clamped to [`MIN_EXPERIENCE_MULTIPLIER`, `MAX_EXPERIENCE_MULTIPLIER`].
///
/// ```rust
/// use calc_core::setup_factors::{experience_multiplier, OperatorExperience, JobFamiliarity};
///
/// let m = experience_multiplier(OperatorExperience::Expert, JobFamiliarity::Repeat);
/// assert!((m - 0.68).abs() < 1e-9);
/// ```
pub fn experience_multiplier(operator: OperatorExperience, familiarity: JobFamiliarity) -> f64 {
    (operator.multiplier() * familiarity.multiplier())
        .clamp(MIN_EXPERIENCE_MULTIPLIER, MAX_EXPERIENCE_MULTIPLIER)
}
