//! Analysis engines for contract scanning.

pub mod static_analysis;

pub use static_analysis::{
    extract_contract_name, AnalyzerConfig, ScanProgress, StaticAnalyzer, UNNAMED_CONTRACT,
};
