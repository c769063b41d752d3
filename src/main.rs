use anyhow::{anyhow, bail, Context, Result};
use log::info;
use std::path::{Path, PathBuf};

const USAGE: &str = "Usage: jack-compiler [--xml] [filename.jack | directory]";

struct Options {
    /// A single `.jack` file or a directory of them.
    input: PathBuf,
    /// Also write the parse trace as `.xml` next to each `.vm` file.
    emit_xml: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut input = None;
    let mut emit_xml = false;
    // The 'first argument' is the path to the executable.
    for arg in args.into_iter().skip(1) {
        match &arg[..] {
            "--xml" => emit_xml = true,
            flag if flag.starts_with('-') => bail!("Unknown option '{}'.\n{}", flag, USAGE),
            _ if input.is_some() => bail!("Expected one input path.\n{}", USAGE),
            _ => input = Some(PathBuf::from(&arg)),
        }
    }
    let input = input.ok_or_else(|| anyhow!("Expected one input path.\n{}", USAGE))?;
    Ok(Options { input, emit_xml })
}

fn sources(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_owned()]);
    }
    let mut files = Vec::new();
    let entries = std::fs::read_dir(input)
        .with_context(|| format!("Failed to read directory '{}'", input.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "jack") {
            files.push(path);
        }
    }
    // Directory order is arbitrary; keep the output order stable.
    files.sort();
    if files.is_empty() {
        bail!("No .jack files in '{}'", input.display());
    }
    Ok(files)
}

fn compile_file(path: &Path, emit_xml: bool) -> Result<()> {
    let file_contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
    let compiled = if emit_xml {
        jack_compiler::compile_with_trace(&file_contents)
    } else {
        jack_compiler::compile(&file_contents)
    }
    .with_context(|| format!("Failed to compile '{}'", path.display()))?;

    let vm_path = path.with_extension("vm");
    std::fs::write(&vm_path, compiled.vm_code())
        .with_context(|| format!("Failed to write '{}'", vm_path.display()))?;
    info!(
        "Wrote {} ({} instructions)",
        vm_path.display(),
        compiled.commands.len()
    );

    if emit_xml {
        let xml_path = path.with_extension("xml");
        std::fs::write(&xml_path, compiled.xml())
            .with_context(|| format!("Failed to write '{}'", xml_path.display()))?;
        info!("Wrote {}", xml_path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = parse_args(std::env::args())?;
    for path in sources(&options.input)? {
        compile_file(&path, options.emit_xml)?;
    }
    Ok(())
}
