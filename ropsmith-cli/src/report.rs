use std::fmt::Write as _;
use std::path::Path;

use colored::Colorize;
use ropsmith_core::{Classification, GadgetMatch, GadgetScan, SectionDescriptor};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub const BYTES_PER_LINE: usize = 16;

pub fn banner() -> String {
    format!(
        "{}\nVersion: {}\nDescription: ROP gadget finder.\n{}\n",
        "=== ROPsmith ===".bold(),
        env!("CARGO_PKG_VERSION"),
        "================".bold()
    )
}

#[derive(Tabled)]
struct ClassificationRow {
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Bitness")]
    bitness: String,
    #[tabled(rename = "Endianness")]
    endianness: String,
    #[tabled(rename = "Architecture")]
    architecture: String,
}

pub fn classification_table(classification: &Classification) -> String {
    let row = ClassificationRow {
        format: classification.format.to_string(),
        bitness: classification.bitness.to_string(),
        endianness: classification.endianness.to_string(),
        architecture: classification.architecture.to_string(),
    };
    let mut table = Table::new([row]);
    table.with(Style::rounded());
    table.to_string()
}

/// Upper-case hex pairs, `BYTES_PER_LINE` to a line.
pub fn hex_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(BYTES_PER_LINE)
        .map(|line| {
            line.iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

pub fn section_summary(section: &SectionDescriptor) -> String {
    format!(
        "{} offset={:#x} size={:#x} vaddr={:#x}",
        section.name, section.file_offset, section.size, section.virtual_address
    )
}

fn gadget_block(out: &mut String, gadget: &GadgetMatch<'_>) {
    let _ = writeln!(
        out,
        "{} at file_offset={:#x}  vaddr={:#x}",
        "GADGET (ret)".green().bold(),
        gadget.file_offset,
        gadget.virtual_address
    );
    let _ = writeln!(out, "Context ({} bytes before):", gadget.lead_in());
    for line in hex_lines(gadget.context) {
        let _ = writeln!(out, "{line}");
    }
}

pub fn render_scan(scan: &GadgetScan<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", section_summary(&scan.section));
    for gadget in &scan.matches {
        gadget_block(&mut out, gadget);
        out.push('\n');
    }
    let _ = writeln!(out, "Found {} RET instructions.", scan.count());
    out
}

#[derive(Debug, Serialize)]
pub struct ClassificationReport {
    pub format: String,
    pub bitness: String,
    pub endianness: String,
    pub architecture: String,
}

impl From<Classification> for ClassificationReport {
    fn from(c: Classification) -> Self {
        Self {
            format: c.format.to_string(),
            bitness: c.bitness.to_string(),
            endianness: c.endianness.to_string(),
            architecture: c.architecture.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SectionReport {
    pub name: &'static str,
    pub file_offset: u64,
    pub size: u64,
    pub virtual_address: u64,
}

#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub file_offset: u64,
    pub virtual_address: u64,
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub path: String,
    pub classification: ClassificationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchReport>>,
}

impl Report {
    pub fn new(path: &Path, classification: Classification) -> Self {
        Self {
            path: path.display().to_string(),
            classification: classification.into(),
            section: None,
            count: None,
            matches: None,
        }
    }

    pub fn with_scan(mut self, scan: &GadgetScan<'_>) -> Self {
        self.section = Some(SectionReport {
            name: scan.section.name,
            file_offset: scan.section.file_offset,
            size: scan.section.size,
            virtual_address: scan.section.virtual_address,
        });
        self.count = Some(scan.count());
        self.matches = Some(
            scan.matches
                .iter()
                .map(|m| MatchReport {
                    file_offset: m.file_offset,
                    virtual_address: m.virtual_address,
                    context: hex_lines(m.context).join(" "),
                })
                .collect(),
        );
        self
    }
}
