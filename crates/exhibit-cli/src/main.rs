use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use exhibit_core::{compare, generate, verdict};

#[derive(Parser, Debug)]
#[command(name = "exhibit", version, about = "Exhibit CLI - Forensic Admissibility Records for Office Documents")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Generate a forensic record for a .docx or .xlsx file
	Generate {
		/// Path to the document to fingerprint
		file: PathBuf,
		/// Where to write the serialized record
		#[arg(long, default_value = "forensic_data.json")]
		out: PathBuf,
	},
	/// Compare two serialized records and print the verdict
	Compare {
		/// First record file (.json)
		first: PathBuf,
		/// Second record file (.json)
		second: PathBuf,
	},
}

fn main() -> Result<()> {
	// Initialize tracing
	tracing_subscriber::fmt::init();

	let cli = Cli::parse();
	match cli.command {
		Commands::Generate { file, out } => {
			let file_name = file
				.file_name()
				.and_then(|name| name.to_str())
				.with_context(|| format!("{} has no usable file name", file.display()))?;

			let bytes =
				fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?;

			let record = generate(file_name, &bytes)?;
			fs::write(&out, record.to_json_bytes()?)
				.with_context(|| format!("cannot write record to {}", out.display()))?;

			println!("✅ Forensic record generated successfully!");
			println!("📄 Source: {}", file.display());
			println!("🔒 Content hash: {}", record.hash);
			println!("💾 Record written to: {}", out.display());
		}
		Commands::Compare { first, second } => {
			ensure_record_extension(&first)?;
			ensure_record_extension(&second)?;

			let first_bytes =
				fs::read(&first).with_context(|| format!("cannot read {}", first.display()))?;
			let second_bytes =
				fs::read(&second).with_context(|| format!("cannot read {}", second.display()))?;

			let admissible = compare(&first_bytes, &second_bytes)?;
			println!("{}", verdict(admissible));
		}
	}
	Ok(())
}

/// Records travel as .json artifacts; refuse anything else up front
fn ensure_record_extension(path: &Path) -> Result<()> {
	let is_record = path
		.extension()
		.map(|ext| ext.eq_ignore_ascii_case("json"))
		.unwrap_or(false);

	if !is_record {
		bail!(
			"{} is not a serialized forensic record (.json expected)",
			path.display()
		);
	}
	Ok(())
}
