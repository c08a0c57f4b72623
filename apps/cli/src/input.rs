use std::{fs, io::Write, path::Path};

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Raw field values as typed, before payload capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub sequence: String,
    pub age: String,
    pub gender: String,
}

pub fn read_sequence_file(path: &Path) -> anyhow::Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read sequence file '{}'", path.display()))?;
    Ok(parse_sequence_text(&raw))
}

/// Accepts plain or FASTA text. Header (`>`) and comment (`;`) lines are
/// dropped and the remaining lines are joined without whitespace.
pub fn parse_sequence_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('>') && !line.starts_with(';'))
        .flat_map(|line| line.chars().filter(|c| !c.is_whitespace()))
        .collect()
}

/// Prompts for one form. `None` when input ends or the sequence line is blank.
pub async fn prompt_form<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    submit_label: &str,
) -> anyhow::Result<Option<FormValues>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "[{submit_label}] DNA sequence (blank to quit): ")?;
    out.flush()?;
    let Some(sequence) = lines.next_line().await.context("failed to read sequence")? else {
        return Ok(None);
    };
    let sequence = sequence.trim().to_string();
    if sequence.is_empty() {
        return Ok(None);
    }

    write!(out, "Age (optional, 0-120): ")?;
    out.flush()?;
    let age = lines
        .next_line()
        .await
        .context("failed to read age")?
        .unwrap_or_default();

    write!(out, "Gender (optional, M/F): ")?;
    out.flush()?;
    let gender = lines
        .next_line()
        .await
        .context("failed to read gender")?
        .unwrap_or_default();

    Ok(Some(FormValues {
        sequence,
        age,
        gender,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn fasta_headers_and_line_breaks_are_stripped() {
        let raw = ">chr17 BRCA1 fragment\nATCGAT\n  CGTT AG\n;note\nGGC\n";
        assert_eq!(parse_sequence_text(raw), "ATCGATCGTTAGGGC");
    }

    #[test]
    fn plain_text_is_kept_verbatim_apart_from_whitespace() {
        assert_eq!(parse_sequence_text("acgtn-xx\n"), "acgtn-xx");
    }

    #[tokio::test]
    async fn prompts_read_three_fields() {
        let input: &[u8] = b"ATCGATCGATCG\n42\nf\n";
        let mut lines = BufReader::new(input).lines();
        let mut out = Vec::new();

        let form = prompt_form(&mut lines, &mut out, "Analyze DNA")
            .await
            .expect("prompt")
            .expect("form");

        assert_eq!(
            form,
            FormValues {
                sequence: "ATCGATCGATCG".into(),
                age: "42".into(),
                gender: "f".into(),
            }
        );
        assert!(String::from_utf8_lossy(&out).starts_with("[Analyze DNA] DNA sequence"));
    }

    #[tokio::test]
    async fn blank_sequence_or_eof_ends_session() {
        let input: &[u8] = b"\n";
        let mut lines = BufReader::new(input).lines();
        let form = prompt_form(&mut lines, &mut Vec::<u8>::new(), "Analyze DNA")
            .await
            .expect("prompt");
        assert_eq!(form, None);

        let input: &[u8] = b"";
        let mut lines = BufReader::new(input).lines();
        let form = prompt_form(&mut lines, &mut Vec::<u8>::new(), "Analyze DNA")
            .await
            .expect("prompt");
        assert_eq!(form, None);
    }

    #[tokio::test]
    async fn missing_optional_lines_default_to_blank() {
        let input: &[u8] = b"GATTACA\n";
        let mut lines = BufReader::new(input).lines();
        let form = prompt_form(&mut lines, &mut Vec::<u8>::new(), "Analyze DNA")
            .await
            .expect("prompt")
            .expect("form");
        assert_eq!(form.age, "");
        assert_eq!(form.gender, "");
    }
}
