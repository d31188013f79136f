use html::DOMContent;
use tracing::{span, trace, Level};

use crate::backend::{HtmlParser, HtmlSerializer, NomHtml};
use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::walker::sanitize_fragment;

/// Parse, sanitize and serialize with pluggable parser and serializer
#[derive(Debug, Clone, Default)]
pub struct Sanitizer<P = NomHtml, S = NomHtml> {
    parser: P,
    serializer: S,
    max_input_len: Option<usize>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: HtmlParser, S: HtmlSerializer> Sanitizer<P, S> {
    pub fn with_backends(parser: P, serializer: S) -> Self {
        Self {
            parser,
            serializer,
            max_input_len: None,
        }
    }

    /// Reject inputs longer than `len` bytes before parsing them
    pub fn max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = Some(len);
        self
    }

    fn check_len(&self, len: usize) -> Result<()> {
        match self.max_input_len {
            Some(max) if len > max => Err(Error::InvalidInput(format!(
                "input is {} bytes, limit is {}",
                len, max
            ))),
            _ => Ok(()),
        }
    }

    pub fn sanitize(&self, input: &str, policy: &Policy) -> Result<String> {
        self.check_len(input.len())?;
        let span = span!(Level::DEBUG, "sanitize", len = input.len());
        let _enter = span.enter();
        let tree = self.parser.parse(input);
        let output = self.serializer.serialize(&sanitize_fragment(&tree, policy));
        trace!(len = output.len(), "sanitized");
        Ok(output)
    }

    /// Like [`sanitize`](Self::sanitize) for raw bytes, which must be UTF-8
    pub fn sanitize_bytes(&self, input: &[u8], policy: &Policy) -> Result<String> {
        self.check_len(input.len())?;
        let input = std::str::from_utf8(input)
            .map_err(|e| Error::InvalidInput(format!("input is not UTF-8: {}", e)))?;
        self.sanitize(input, policy)
    }

    /// Sanitize an already-built tree, skipping the parser
    pub fn sanitize_tree(&self, contents: &[DOMContent], policy: &Policy) -> String {
        self.serializer.serialize(&sanitize_fragment(contents, policy))
    }
}
