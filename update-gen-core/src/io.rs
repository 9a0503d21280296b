use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

/// Reads a gzip-compressed UTF-8 file and returns its decompressed content.
///
/// - Reads the entire file into memory
/// - Fails with `InvalidData` if the payload is not gzip or not UTF-8
pub(crate) fn read_gzip_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	GzDecoder::new(BufReader::new(File::open(filename)?)).read_to_string(&mut contents)?;
	Ok(contents)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/spam_model.json.gz` + `"bin"` → `data/spam_model.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename, dropping every extension.
///
/// Examples:
/// - `"./data/spam_model.json.gz"` → `"spam_model"`
/// - `"model.dat"` → `"model"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let name = input_path
		.as_ref()
		.file_name()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?
		.to_string_lossy();

	Ok(name.split('.').next().unwrap_or_default().to_owned())
}

/// Returns true when `candidate` exists and was modified after `reference`.
///
/// Any metadata failure counts as "not newer".
pub(crate) fn is_newer<A: AsRef<Path>, B: AsRef<Path>>(candidate: A, reference: B) -> bool {
	let modified = |path: &Path| path.metadata().and_then(|m| m.modified()).ok();
	match (modified(candidate.as_ref()), modified(reference.as_ref())) {
		(Some(candidate), Some(reference)) => candidate >= reference,
		_ => false,
	}
}
