use log::{debug, warn};
use nom::{error::Error as NomError, Finish};

use rtquery_core::{IpPrefix, ParseError, Record};

use crate::{
    basic::parser::{parse_blank, parse_comment, parse_record_head},
    DumpLoader, LoadError,
};

/// Knobs of [DefaultDumpLoader].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Drop malformed records (logging a warning) instead of failing the
    /// whole load. Off by default, a partial table is never served silently.
    pub skip_malformed: bool,
}

impl LoaderConfig {
    #[inline]
    pub fn skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }
}

/// The kinds of line found in a dump.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Comment,
    /// Starts with whitespace, belongs to the previous record.
    Continuation(&'a str),
    /// Starts in the first column with a prefix.
    Head(&'a str),
}

impl<'a> From<&'a str> for Line<'a> {
    fn from(line: &'a str) -> Self {
        if parse_blank::<NomError<&str>>(line).is_ok() {
            Line::Blank
        } else if parse_comment::<NomError<&str>>(line).is_ok() {
            Line::Comment
        } else if line.starts_with(char::is_whitespace) {
            Line::Continuation(line.trim_end())
        } else {
            Line::Head(line)
        }
    }
}

/// Parse the first line of a record into its prefix and attributes.
fn parse_head(line: &str) -> Result<(IpPrefix, &str), ParseError> {
    let (_, ((addr, len), attributes)) = parse_record_head::<NomError<&str>>(line)
        .finish()
        .map_err(|_| ParseError::Malformed(line.to_owned()))?;
    let len = len.ok_or_else(|| ParseError::MissingPrefixLength(addr.to_owned()))?;
    let prefix = IpPrefix::from_parts(addr, Some(len))?;
    if attributes.is_empty() {
        return Err(ParseError::MissingAttributes(prefix.to_string()));
    }
    Ok((prefix, attributes))
}

/// Loader for the default dump format:
///
/// ```text
/// # comment
/// 10.0.0.0/8          via 192.0.2.1 on eth0 [bgp1 2024-01-01] * (100) [AS65000i]
///         Type: BGP univ
///         BGP.as_path: 65000
/// 2001:db8::/32       unreachable [static1 2024-01-01] * (200)
/// ```
///
/// A record starts in the first column with a prefix in CIDR notation
/// followed by its attributes. Indented lines continue the attributes of the
/// previous record and are joined with `\n`. Blank and `#` lines are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDumpLoader {
    config: LoaderConfig,
}

impl DefaultDumpLoader {
    #[inline]
    pub fn new(config: LoaderConfig) -> Self {
        DefaultDumpLoader { config }
    }

    #[inline]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn reject(&self, line: usize, source: ParseError) -> Result<(), LoadError> {
        if self.config.skip_malformed {
            warn!("skipping dump line {}: {}", line, source);
            Ok(())
        } else {
            Err(LoadError::Record { line, source })
        }
    }
}

impl DumpLoader for DefaultDumpLoader {
    fn load(&self, content: &str) -> Result<Vec<Record>, LoadError> {
        let mut records = vec![];
        let mut pending: Option<(IpPrefix, String)> = None;
        // continuation lines of a skipped record are skipped as well
        let mut skipping = false;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            match Line::from(line) {
                Line::Blank | Line::Comment => {}
                Line::Continuation(text) => match pending.as_mut() {
                    Some((_, attributes)) => {
                        attributes.push('\n');
                        attributes.push_str(text);
                    }
                    None if skipping => {}
                    None => {
                        self.reject(line_no, ParseError::OrphanContinuation)?;
                        skipping = true;
                    }
                },
                Line::Head(text) => {
                    if let Some((prefix, attributes)) = pending.take() {
                        records.push(Record::new(prefix, attributes));
                    }
                    match parse_head(text) {
                        Ok((prefix, attributes)) => {
                            pending = Some((prefix, attributes.to_owned()));
                            skipping = false;
                        }
                        Err(e) => {
                            self.reject(line_no, e)?;
                            skipping = true;
                        }
                    }
                }
            }
        }
        if let Some((prefix, attributes)) = pending {
            records.push(Record::new(prefix, attributes));
        }
        debug!("parsed {} records from dump", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"
# routing table snapshot
0.0.0.0/0           via 192.0.2.1 on eth0 [static1 2024-01-01] * (200)
10.0.0.0/8          via 192.0.2.1 on eth0 [bgp1 2024-01-01] * (100) [AS65000i]
	Type: BGP univ
	BGP.as_path: 65000

10.1.0.0/16         via 192.0.2.2 on eth1 [bgp2 2024-01-01] * (100) [AS65001i]
2001:db8::/32       unreachable [static1 2024-01-01] * (200)
"#;

    #[test]
    fn test_line_kinds() {
        assert_eq!(Line::from(""), Line::Blank);
        assert_eq!(Line::from(" \t "), Line::Blank);
        assert_eq!(Line::from("  # note"), Line::Comment);
        assert_eq!(Line::from("\tType: BGP  "), Line::Continuation("\tType: BGP"));
        assert_eq!(Line::from("10.0.0.0/8 x"), Line::Head("10.0.0.0/8 x"));
    }

    #[test]
    fn test_load_records() {
        let records = DefaultDumpLoader::default().load(DUMP).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].prefix().to_string(), "0.0.0.0/0");
        assert_eq!(records[1].prefix().to_string(), "10.0.0.0/8");
        assert_eq!(
            records[1].attributes(),
            "via 192.0.2.1 on eth0 [bgp1 2024-01-01] * (100) [AS65000i]\n\tType: BGP univ\n\tBGP.as_path: 65000"
        );
        assert_eq!(
            records[2].attributes(),
            "via 192.0.2.2 on eth1 [bgp2 2024-01-01] * (100) [AS65001i]"
        );
        assert!(matches!(records[3], Record::V6(_)));
    }

    #[test]
    fn test_display_round_trip() {
        let records = DefaultDumpLoader::default().load(DUMP).unwrap();
        let printed: String = records.iter().map(|r| format!("{}\n", r)).collect();
        let reloaded = DefaultDumpLoader::default().load(&printed).unwrap();
        assert_eq!(records, reloaded);
    }

    #[test]
    fn test_host_bits_are_masked() {
        let records = DefaultDumpLoader::default()
            .load("192.168.42.42/24 via 192.0.2.1")
            .unwrap();
        assert_eq!(records[0].prefix().to_string(), "192.168.42.0/24");
    }

    #[test]
    fn test_malformed_aborts() {
        let loader = DefaultDumpLoader::default();
        let cases = [
            ("10.0.0.0/8 a\n10.0.0.0/33 b", 2),
            ("10.0.0.0/8 a\n\n10.0.0.0 b", 3),
            ("10.0.0.300/8 a", 1),
            ("10.0.0.0/8", 1),
            ("10.0.0.0/8x a", 1),
            ("  orphan", 1),
            ("Table master4:", 1),
        ];
        for (dump, line) in cases {
            match loader.load(dump) {
                Err(LoadError::Record { line: l, .. }) => assert_eq!(l, line, "{dump:?}"),
                other => panic!("{dump:?} loaded as {other:?}"),
            }
        }
        assert!(matches!(
            loader.load("10.0.0.0/8"),
            Err(LoadError::Record {
                source: ParseError::MissingAttributes(_),
                ..
            })
        ));
        assert!(matches!(
            loader.load("10.0.0.0 a"),
            Err(LoadError::Record {
                source: ParseError::MissingPrefixLength(_),
                ..
            })
        ));
    }

    #[test]
    fn test_skip_malformed() {
        let loader = DefaultDumpLoader::new(LoaderConfig::default().skip_malformed(true));
        let dump = "10.0.0.0/8 a\n10.0.0.0/40 b\n\tcontinues b\n10.1.0.0/16 c\n";
        let records = loader.load(dump).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].attributes(), "a");
        assert_eq!(records[1].attributes(), "c");
    }
}
