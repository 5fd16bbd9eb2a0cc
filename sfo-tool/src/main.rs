use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sfo_core::{decode, decode_layout, encode, ParamTypes};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the signature, version and every parameter
    Dump {
        #[arg(short, long, default_value = "param.sfo")]
        input: PathBuf,

        /// Also print the header fields and index table
        #[arg(short, long)]
        layout: bool,
    },
    /// Decode a file and write it back using a type metadata file
    Rewrite {
        #[arg(short, long, default_value = "param.sfo")]
        input: PathBuf,

        #[arg(short, long, default_value = "test.sfo")]
        output: PathBuf,

        #[arg(short, long, default_value = "ptypes.yaml")]
        types: PathBuf,
    },
    /// Derive a type metadata file from an existing SFO file
    Types {
        #[arg(short, long, default_value = "param.sfo")]
        input: PathBuf,

        #[arg(short, long, default_value = "ptypes.yaml")]
        output: PathBuf,
    },
}

fn read_sfo(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn dump(input: &Path, layout: bool) -> Result<()> {
    let bytes = read_sfo(input)?;
    if layout {
        let layout = decode_layout(&bytes).with_context(|| format!("decode {}", input.display()))?;
        println!("{layout}");
    }
    let doc = decode(&bytes).with_context(|| format!("decode {}", input.display()))?;
    print!("{doc}");
    Ok(())
}

fn rewrite(input: &Path, output: &Path, types: &Path) -> Result<()> {
    let types = ParamTypes::load(types).with_context(|| format!("load {}", types.display()))?;
    let doc = decode(&read_sfo(input)?).with_context(|| format!("decode {}", input.display()))?;
    let bytes = encode(&doc, &types).with_context(|| format!("encode {}", input.display()))?;
    std::fs::write(output, &bytes).with_context(|| format!("write {}", output.display()))?;
    log::info!(
        "wrote {} parameters ({} bytes) to {}",
        doc.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}

fn export_types(input: &Path, output: &Path) -> Result<()> {
    let layout = decode_layout(&read_sfo(input)?).with_context(|| format!("decode {}", input.display()))?;
    let types = ParamTypes::infer(&layout)?;
    std::fs::write(output, types.to_yaml_string()?)
        .with_context(|| format!("write {}", output.display()))?;
    log::info!("wrote {} parameter types to {}", types.len(), output.display());
    Ok(())
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Dump { input, layout } => dump(&input, layout),
        Command::Rewrite {
            input,
            output,
            types,
        } => rewrite(&input, &output, &types),
        Command::Types { input, output } => export_types(&input, &output),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sfo_core::{Document, Value};

    #[test]
    fn cli_arguments_are_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_usual_filenames() {
        let args = Args::parse_from(["sfo-tool", "rewrite"]);
        match args.command {
            Command::Rewrite {
                input,
                output,
                types,
            } => {
                assert_eq!(input, PathBuf::from("param.sfo"));
                assert_eq!(output, PathBuf::from("test.sfo"));
                assert_eq!(types, PathBuf::from("ptypes.yaml"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn types_then_rewrite_reproduces_file() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("sfo-tool-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let input = dir.join("param.sfo");
        let types_path = dir.join("ptypes.yaml");
        let output = dir.join("test.sfo");

        let mut types = ParamTypes::new();
        types.insert("TITLE", sfo_core::ParamType::new(sfo_core::TypeCode::Utf8String, false, 16));
        types.insert("ATTRIBUTE", sfo_core::ParamType::new(sfo_core::TypeCode::UInt32, true, 4));
        let mut doc = Document::default();
        doc.insert("TITLE", Value::from("Demo"));
        doc.insert("ATTRIBUTE", Value::from(5u32));
        let original = encode(&doc, &types)?;
        std::fs::write(&input, &original)?;

        export_types(&input, &types_path)?;
        rewrite(&input, &output, &types_path)?;
        assert_eq!(std::fs::read(&output)?, original);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
