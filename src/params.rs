//! CLI and paramfile argument parsing (spec §6 "External interfaces"). The
//! core only owns the parameter *struct* it consumes; loading JSON domain
//! files is an ambient convenience (`[AMBIENT] Configuration & domain loading`)
//! kept alongside it, mirroring the teacher's parser crates used for similar
//! config/CLI plumbing.

use std::str::FromStr;

use crate::error::ConfigError;

/// Which exemplar simulator to run (spec §1 "two exemplar simulators").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    Assembly,
    Hotel,
}

impl FromStr for Problem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assembly" => Ok(Problem::Assembly),
            "hotel" => Ok(Problem::Hotel),
            other => Err(ConfigError::UnknownProblem(other.to_string())),
        }
    }
}

/// The one-shot command-line form (spec §6 "One-shot form").
#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "rageplan", about = "Online POMCP planner for a robotic assembly assistant")]
pub struct CommandLine {
    /// `problem=<assembly|hotel|...>` selection.
    pub problem: Option<String>,

    #[arg(long = "inputFile")]
    pub input_file: Option<String>,
    #[arg(long = "outputFile")]
    pub output_file: Option<String>,
    #[arg(long)]
    pub size: Option<u32>,
    #[arg(long)]
    pub number: Option<u32>,
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long = "minDoubles")]
    pub min_doubles: Option<u32>,
    #[arg(long = "maxDoubles")]
    pub max_doubles: Option<u32>,
    #[arg(long)]
    pub runs: Option<u32>,
    #[arg(long = "numSteps")]
    pub num_steps: Option<u32>,
    #[arg(long)]
    pub verbose: bool,
    #[arg(long = "treeKnowledge")]
    pub tree_knowledge: Option<u32>,
    #[arg(long = "rolloutKnowledge")]
    pub rollout_knowledge: Option<u32>,
    #[arg(long = "fTable")]
    pub f_table: bool,

    // Paramfile form, for the robot-integrated driver.
    #[arg(long = "paramFile")]
    pub param_file: Option<String>,
    #[arg(long = "problemFile")]
    pub problem_file: Option<String>,
    #[arg(long = "domainFile")]
    pub domain_file: Option<String>,
    #[arg(long = "use_mockup_gui")]
    pub use_mockup_gui: Option<bool>,
}

#[cfg(feature = "cli")]
impl CommandLine {
    pub fn resolve_problem(&self) -> Result<Problem, ConfigError> {
        match &self.problem {
            Some(p) => p.parse(),
            None => Err(ConfigError::MissingProblem),
        }
    }
}

/// Whitespace key/value paramfile reader (spec §6 "Parameter file"), tolerant
/// of unknown keys per Design Notes ("Parser. Tolerant of unknown keys with a
/// warning").
#[derive(Debug, Clone, Default)]
pub struct ParamFile {
    pub problem: Option<String>,
    pub problem_file: Option<String>,
    pub output_file: Option<String>,
    pub n_sims: Option<u32>,
    pub timeout: Option<u64>,
    pub verbose: Option<bool>,
    pub tree_knowledge: Option<String>,
    pub policy: Option<String>,
    pub ire: Option<bool>,
    pub perceive: Option<f64>,
    pub bring_success: Option<f64>,
    pub activation: Option<f64>,
    pub pgs_alpha: Option<f64>,
    pub discount: Option<f64>,
    pub f_discount: Option<f64>,
    pub transition_rate: Option<f64>,
    pub expertise: Option<f64>,
    pub entropy: Option<f64>,
    pub domain_file: Option<String>,
}

impl ParamFile {
    pub fn parse(text: &str) -> Self {
        let mut out = ParamFile::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(key) = parts.next() else {
                continue;
            };
            let value: String = parts.collect::<Vec<_>>().join(" ");
            out.set(key, &value);
        }
        out
    }

    pub fn resolve_problem(&self) -> Result<Problem, ConfigError> {
        match &self.problem {
            Some(p) => p.parse(),
            None => Err(ConfigError::MissingProblem),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match key {
            "problem" => self.problem = Some(value.to_string()),
            "problemFile" => self.problem_file = Some(value.to_string()),
            "outputFile" => self.output_file = Some(value.to_string()),
            "nSims" => self.n_sims = value.parse().ok(),
            "timeout" => self.timeout = value.parse().ok(),
            "verbose" => self.verbose = parse_bool(value),
            "treeKnowledge" => self.tree_knowledge = Some(value.to_string()),
            "policy" => self.policy = Some(value.to_string()),
            "ire" => self.ire = parse_bool(value),
            "perceive" => self.perceive = value.parse().ok(),
            "bringSuccess" => self.bring_success = value.parse().ok(),
            "activation" => self.activation = value.parse().ok(),
            "PGSAlpha" => self.pgs_alpha = value.parse().ok(),
            "discount" => self.discount = value.parse().ok(),
            "fDiscount" => self.f_discount = value.parse().ok(),
            "transitionRate" => self.transition_rate = value.parse().ok(),
            "expertise" => self.expertise = value.parse().ok(),
            "entropy" => self.entropy = value.parse().ok(),
            "domainFile" => self.domain_file = Some(value.to_string()),
            other => log::warn!("unrecognised paramfile key {other:?}, ignoring"),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_tolerated() {
        let pf = ParamFile::parse("problem assembly\nbogusKey 42\ndiscount 0.9\n");
        assert_eq!(pf.problem.as_deref(), Some("assembly"));
        assert_eq!(pf.discount, Some(0.9));
    }

    #[test]
    fn missing_problem_is_an_error() {
        let pf = ParamFile::default();
        assert!(matches!(pf.resolve_problem(), Err(ConfigError::MissingProblem)));
    }

    #[test]
    fn unrecognised_problem_name_is_an_error() {
        let pf = ParamFile::parse("problem something-else\n");
        assert!(matches!(pf.resolve_problem(), Err(ConfigError::UnknownProblem(_))));
    }
}
