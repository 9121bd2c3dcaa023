//! Contract documents
//!
//! Source, destination and transformation contracts, the generators that
//! assemble them from analysis results, and file validation.
//!
//! # Example
//!
//! ```no_run
//! use contract_gen::contract::{generate_source_contract, Contract};
//! use contract_gen::sources::AnalyzeOptions;
//!
//! let contract = generate_source_contract("data/bank.csv", "bank_csv", &AnalyzeOptions::new(), None)?;
//! let json = serde_json::to_string_pretty(&Contract::from(contract))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod generator;
mod types;
mod validate;

pub use generator::{
    generate_destination_contract, generate_source_analysis, generate_source_contract,
    generate_transformation_contract, DestinationRequest,
};
pub use types::{
    Contract, DatabaseLocation, DestinationContract, DestinationSchema, ExecutionPlan,
    FileLocation, QualityMetrics, SourceContract, SourceLocation, SourceSchema,
    TransformationContract, ValidationRules, CONTRACT_VERSION,
};
pub use validate::{
    load_contract, parse_contract, validate_contract_file, validate_path, ValidationOutcome,
    ValidationReport,
};
