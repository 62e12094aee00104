//! Line-oriented prompting over any async reader/writer pair.
//!
//! Generic over the streams so the prompt flow can be driven from byte
//! slices in tests and from stdin/stdout in the binary.

use std::io;

use rawhttp_core::{RequestDescriptor, DEFAULT_PORT};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stderr, Stdin, Stdout,
};

/// A port answer that names a number outside `1..=65535`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid port {0}: must be between 1 and 65535")]
pub struct PortError(String);

/// One request's worth of answers. The port is checked only after every
/// question has been asked.
pub type Answers = Result<RequestDescriptor, PortError>;

pub struct Console<R, W, E> {
    input: R,
    out: W,
    err: E,
}

impl Console<BufReader<Stdin>, Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            tokio::io::stderr(),
        )
    }
}

impl<R, W, E> Console<R, W, E>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W, err: E) -> Self {
        Self { input, out, err }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (R, W, E) {
        (self.input, self.out, self.err)
    }

    /// Print `question` and read one answer line without its line ending.
    /// Bytes that are not UTF-8 become U+FFFD. `None` once input is exhausted.
    pub async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.out.write_all(question.as_bytes()).await?;
        self.out.flush().await?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.strip_suffix(b"\n").unwrap_or(&line);
        let trimmed = trimmed.strip_suffix(b"\r").unwrap_or(trimmed);
        Ok(Some(String::from_utf8_lossy(trimmed).into_owned()))
    }

    /// A yes/no question; only `y` (any case) counts as yes.
    pub async fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self
            .ask(question)
            .await?
            .is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y")))
    }

    pub async fn say(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }

    pub async fn complain(&mut self, text: &str) -> io::Result<()> {
        self.err.write_all(text.as_bytes()).await?;
        self.err.write_all(b"\n").await?;
        self.err.flush().await
    }

    /// Walk the user through every field of one request.
    ///
    /// An empty data answer means "no body". Returns `None` if input ends
    /// before the request is complete.
    pub async fn collect_descriptor(&mut self) -> io::Result<Option<Answers>> {
        let Some(hostname) = self.ask("Enter hostname: ").await? else {
            return Ok(None);
        };
        let Some(port) = self.ask("Enter port (default 80): ").await? else {
            return Ok(None);
        };
        let Some(path) = self.ask("Enter path: ").await? else {
            return Ok(None);
        };
        let Some(method) = self.ask("Enter method (GET, POST, etc.): ").await? else {
            return Ok(None);
        };

        let mut descriptor = RequestDescriptor::new(hostname, method).with_path(path);

        while self.confirm("Do you want to add a header? (y/n): ").await? {
            let Some(name) = self.ask("Enter header name: ").await? else {
                return Ok(None);
            };
            let Some(value) = self.ask("Enter header value: ").await? else {
                return Ok(None);
            };
            descriptor.headers.insert(name, value);
        }

        let Some(data) = self.ask("Enter data (for POST/PUT requests): ").await? else {
            return Ok(None);
        };
        if !data.is_empty() {
            descriptor.body = Some(data);
        }

        Ok(Some(parse_port(&port).map(|port| descriptor.with_port(port))))
    }
}

/// Read a port the way `parseInt(answer, 10)` would: leading whitespace, an
/// optional sign, then decimal digits up to the first non-digit.
///
/// No digits, or a value of zero, means `DEFAULT_PORT`. Anything else must
/// fit in `1..=65535`.
pub fn parse_port(answer: &str) -> Result<u16, PortError> {
    let trimmed = answer.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let significant = unsigned[..digits_end].trim_start_matches('0');

    if digits_end == 0 || significant.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    match significant.parse::<u16>() {
        Ok(port) if !negative => Ok(port),
        _ => {
            let sign = if negative { "-" } else { "" };
            Err(PortError(format!("{sign}{significant}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(input: &'static str) -> Console<&'static [u8], Vec<u8>, Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new(), Vec::new())
    }

    #[tokio::test]
    async fn collects_every_field() {
        let mut c = console(
            "example.com\n8080\n/x?y=1\nPOST\ny\nAccept\n*/*\nY\nX-Id\n7\nn\nhello\n",
        );
        let descriptor = c.collect_descriptor().await.unwrap().unwrap().unwrap();

        assert_eq!(descriptor.hostname, "example.com");
        assert_eq!(descriptor.port, Some(8080));
        assert_eq!(descriptor.path, "/x?y=1");
        assert_eq!(descriptor.method, "POST");
        let headers: Vec<_> = descriptor.headers.iter().collect();
        assert_eq!(headers, vec![("Accept", "*/*"), ("X-Id", "7")]);
        assert_eq!(descriptor.body.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn prompts_are_written_in_order() {
        let mut c = console("h\n\n/\nGET\nn\n\n");
        c.collect_descriptor().await.unwrap().unwrap().unwrap();
        let (_, out, _) = c.into_parts();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Enter hostname: Enter port (default 80): Enter path: \
             Enter method (GET, POST, etc.): Do you want to add a header? (y/n): \
             Enter data (for POST/PUT requests): "
        );
    }

    #[tokio::test]
    async fn blank_port_and_data_fall_back_to_defaults() {
        let mut c = console("example.com\n\n/\nGET\nn\n\n");
        let descriptor = c.collect_descriptor().await.unwrap().unwrap().unwrap();

        assert_eq!(descriptor.effective_port(), 80);
        assert!(descriptor.headers.is_empty());
        assert_eq!(descriptor.body, None);
    }

    #[tokio::test]
    async fn repeated_header_name_overwrites() {
        let mut c = console("h\n\n/\nGET\ny\nX\n1\ny\nX\n2\nn\n\n");
        let descriptor = c.collect_descriptor().await.unwrap().unwrap().unwrap();

        assert_eq!(descriptor.headers.len(), 1);
        assert_eq!(descriptor.headers.get("X"), Some("2"));
    }

    #[tokio::test]
    async fn crlf_line_endings_are_stripped() {
        let mut c = console("example.com\r\n81\r\n/\r\nGET\r\nn\r\n\r\n");
        let descriptor = c.collect_descriptor().await.unwrap().unwrap().unwrap();

        assert_eq!(descriptor.hostname, "example.com");
        assert_eq!(descriptor.port, Some(81));
        assert_eq!(descriptor.body, None);
    }

    #[tokio::test]
    async fn input_ending_early_yields_none() {
        let mut c = console("example.com\n80\n");
        assert!(c.collect_descriptor().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn confirm_is_false_at_end_of_input() {
        let mut c = console("");
        assert!(!c.confirm("again? ").await.unwrap());
    }

    #[tokio::test]
    async fn say_and_complain_use_separate_streams() {
        let mut c = console("");
        c.say("to stdout").await.unwrap();
        c.complain("to stderr").await.unwrap();
        let (_, out, err) = c.into_parts();
        assert_eq!(out, b"to stdout\n");
        assert_eq!(err, b"to stderr\n");
    }

    #[tokio::test]
    async fn out_of_range_port_is_reported_after_every_prompt() {
        let mut c = console("h\n70000\n/\nGET\nn\n\n");
        let answers = c.collect_descriptor().await.unwrap().unwrap();
        assert_eq!(
            answers.unwrap_err().to_string(),
            "invalid port 70000: must be between 1 and 65535"
        );

        let (_, out, _) = c.into_parts();
        assert!(String::from_utf8(out).unwrap().ends_with("Enter data (for POST/PUT requests): "));
    }

    #[tokio::test]
    async fn non_utf8_answer_is_decoded_lossily() {
        let mut c = Console::new(&b"caf\xE9\r\nnext\n"[..], Vec::new(), Vec::new());
        assert_eq!(c.ask("? ").await.unwrap().as_deref(), Some("caf\u{FFFD}"));
        assert_eq!(c.ask("? ").await.unwrap().as_deref(), Some("next"));
    }

    #[test]
    fn parse_port_reads_leading_digits() {
        assert_eq!(parse_port("8080"), Ok(8080));
        assert_eq!(parse_port(" 8081 "), Ok(8081));
        assert_eq!(parse_port("3000abc"), Ok(3000));
        assert_eq!(parse_port("+8080"), Ok(8080));
        assert_eq!(parse_port("065535"), Ok(65535));
    }

    #[test]
    fn parse_port_falls_back_to_80() {
        assert_eq!(parse_port(""), Ok(80));
        assert_eq!(parse_port("abc"), Ok(80));
        assert_eq!(parse_port("0"), Ok(80));
        assert_eq!(parse_port("-0"), Ok(80));
        assert_eq!(parse_port("+"), Ok(80));
    }

    #[test]
    fn parse_port_rejects_out_of_range_values() {
        assert_eq!(parse_port("70000"), Err(PortError("70000".to_string())));
        assert_eq!(parse_port("-1"), Err(PortError("-1".to_string())));
        assert_eq!(parse_port("99999999999999999999").unwrap_err().0, "99999999999999999999");
    }
}
