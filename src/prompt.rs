//! Interactive prompting for input and output paths.
//!
//! Each prompt asks again until it gets a valid answer. Reaching the end of
//! the prompt stream is an [`io::ErrorKind::UnexpectedEof`] error.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::PathError;
use crate::utils::{expand_home, has_extension};

pub const RIS_EXTENSION: &str = "ris";
pub const CSV_EXTENSION: &str = "csv";

const INPUT_MESSAGE: &str = "\
Please enter the relative or full path to the RIS file you would like to
convert to a CSV file.";

const OUTPUT_MESSAGE: &str = "\
Please enter the relative or full path where the new CSV file should be
saved, including the file name, e.g. ~/Documents/ris_report.csv";

/// Checks that `path` names a readable `.ris` file.
pub fn validate_input_path(path: &Path) -> Result<PathBuf, PathError> {
    if !has_extension(path, RIS_EXTENSION) {
        return Err(PathError::WrongExtension {
            path: path.to_path_buf(),
            expected: RIS_EXTENSION,
        });
    }

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PathError::NotFound(path.to_path_buf()),
        _ => PathError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    if !metadata.is_file() {
        return Err(PathError::Unreadable {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }

    fs::File::open(path).map_err(|e| PathError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(path.to_path_buf())
}

/// Checks that `path` ends in `.csv` and that its directory exists.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, PathError> {
    if !has_extension(path, CSV_EXTENSION) {
        return Err(PathError::WrongExtension {
            path: path.to_path_buf(),
            expected: CSV_EXTENSION,
        });
    }

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(PathError::NotFound(parent.to_path_buf()))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Asks for the RIS file to convert until a valid path is given.
pub fn prompt_input_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<PathBuf> {
    prompt_until_valid(input, output, INPUT_MESSAGE, validate_input_path)
}

/// Asks for the CSV file to write until a valid path is given.
pub fn prompt_output_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<PathBuf> {
    prompt_until_valid(input, output, OUTPUT_MESSAGE, validate_output_path)
}

/// Waits for the user to press return.
pub fn wait_for_acknowledgement<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    writeln!(output, "Press <return> or <enter> to close the program.")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

fn prompt_until_valid<R, W, F>(
    input: &mut R,
    output: &mut W,
    message: &str,
    validate: F,
) -> io::Result<PathBuf>
where
    R: BufRead,
    W: Write,
    F: Fn(&Path) -> Result<PathBuf, PathError>,
{
    writeln!(output, "\n{message}\n")?;
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no path entered before end of input",
            ));
        }

        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }

        match validate(&expand_home(answer)) {
            Ok(path) => return Ok(path),
            Err(e) => {
                debug!(error = %e, "rejected path");
                writeln!(output, "{e}\nPlease try again.\n")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::io::Cursor;

    fn run<F>(answers: &str, prompt: F) -> (io::Result<PathBuf>, String)
    where
        F: Fn(&mut Cursor<Vec<u8>>, &mut Vec<u8>) -> io::Result<PathBuf>,
    {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = prompt(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_output_prompt_retries_wrong_extension() {
        let (result, shown) = run("report.txt\n\nreport.csv\n", |i, o| prompt_output_path(i, o));

        assert_eq!(result.unwrap(), PathBuf::from("report.csv"));
        assert!(shown.contains("Please end your path with '.csv'"));
        assert_eq!(shown.matches("> ").count(), 3);
    }

    #[test]
    fn test_input_prompt_retries_until_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let ris = dir.path().join("refs.ris");
        fs::write(&ris, "TY  - JOUR\nER  - \n").unwrap();

        let answers = format!(
            "{}\n{}\n{}\n",
            dir.path().join("refs.txt").display(),
            dir.path().join("missing.ris").display(),
            ris.display()
        );
        let (result, shown) = run(&answers, |i, o| prompt_input_path(i, o));

        assert_eq!(result.unwrap(), ris);
        assert!(shown.contains("Please end your path with '.ris'"));
        assert!(shown.contains("That path does not exist"));
    }

    #[test]
    fn test_prompt_stops_at_end_of_input() {
        let (result, _) = run("wrong.txt\n", |i, o| prompt_output_path(i, o));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_answer_is_trimmed() {
        let (result, _) = run("  report.csv  \r\n", |i, o| prompt_output_path(i, o));
        assert_eq!(result.unwrap(), PathBuf::from("report.csv"));
    }

    #[rstest]
    #[case("refs.txt")]
    #[case("refs")]
    #[case("refs.ris.txt")]
    fn test_input_wrong_extension(#[case] path: &str) {
        assert!(matches!(
            validate_input_path(Path::new(path)),
            Err(PathError::WrongExtension { expected: "ris", .. })
        ));
    }

    #[test]
    fn test_input_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("folder.ris");
        fs::create_dir(&fake).unwrap();
        assert!(matches!(
            validate_input_path(&fake),
            Err(PathError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_output_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        assert_eq!(
            validate_output_path(&path),
            Err(PathError::NotFound(dir.path().join("nope")))
        );
    }

    #[test]
    fn test_output_extension_ignores_case() {
        assert!(validate_output_path(Path::new("OUT.CSV")).is_ok());
    }

    #[test]
    fn test_wait_for_acknowledgement() {
        let mut input = Cursor::new(b"\n".to_vec());
        let mut output = Vec::new();
        wait_for_acknowledgement(&mut input, &mut output).unwrap();
        assert!(String::from_utf8(output).unwrap().contains("Press <return>"));
    }
}
