use crate::error::FetchError;
use crate::record::Record;

mod fasta;
mod genbank;

pub use fasta::parse_fasta;
pub use genbank::parse_genbank;

/// Payload formats a batch fetch can be requested in.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RecordFormat {
    /// GenBank flat file, one `LOCUS ... //` block per record
    #[default]
    #[value(name = "gb")]
    GenBank,

    /// FASTA, one `>` header per record
    Fasta,
}

impl RecordFormat {
    /// The `rettype` parameter that asks the fetch service for this format.
    pub fn rettype(&self) -> &'static str {
        match self {
            RecordFormat::GenBank => "gb",
            RecordFormat::Fasta => "fasta",
        }
    }
}

/// Parses a raw batch payload into records, in the order they appear.
pub fn parse_records(payload: &str, format: RecordFormat) -> Result<Vec<Record>, FetchError> {
    match format {
        RecordFormat::GenBank => parse_genbank(payload),
        RecordFormat::Fasta => parse_fasta(payload),
    }
}
