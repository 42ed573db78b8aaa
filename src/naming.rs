//! # Dataset naming conventions
//!
//! Simulated datasets have been written under several layouts over time. Each
//! layout gets its own [`PathMatcher`]; [`PathParser`] tries them in a fixed
//! priority order and keeps the first one that recognises the path's shape.
//!
//! | Convention | Shape |
//! |---|---|
//! | Hierarchical | `{N}_classes/{combo}/noise_{X}/seed_{Y}/trajectories.tsv` |
//! | Flat filename | `{N}/{noise}noise.{combo}.{R}reps.{seed}.tsv` |
//! | Clustered filename | `{N}/clustering/{method}_k{K}/{noise}noise.{combo}.{R}reps.{seed}.clust.tsv` |

/*
 * File: /src/naming.rs
 * Created Date: Monday, October 12th 2026
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-12		Zihan	Matcher chain for the three dataset layouts
 */

use std::fmt;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CLUSTERING_DIR: &str = "clustering";
const DATASET_EXT: &str = ".tsv";
const HIERARCHICAL_FILE: &str = "trajectories.tsv";
const CLUSTERED_EXT: &str = ".clust.tsv";
const NOISE_MARKER: &str = "noise";
const REPS_MARKER: &str = "reps";

/// Parameters identifying one simulated dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetParams {
    pub class_count: usize,
    /// Sorted, joined function tokens
    pub function_combo: String,
    pub noise_level: f64,
    pub seed: u64,
}

/// `{method}_k{K}` directory of a clustering output
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodTag {
    pub method: String,
    pub k: usize,
}

impl MethodTag {
    pub fn new(method: &str, k: usize) -> Self {
        Self {
            method: method.to_string(),
            k,
        }
    }

    pub fn dir_name(&self) -> String {
        format!("{}_k{}", self.method, self.k)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    Hierarchical,
    FlatFilename,
    ClusteredFilename,
}

/// Result of a successful match. `result` is set for clustering outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPath {
    pub params: DatasetParams,
    pub convention: Convention,
    pub result: Option<MethodTag>,
}

/// Token a matcher could not find or could not read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    ClassCount,
    FunctionCombo,
    Noise,
    ReplicateCount,
    Seed,
    MethodDir,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::ClassCount => "class count",
            Token::FunctionCombo => "function combination",
            Token::Noise => "noise level",
            Token::ReplicateCount => "replicate count",
            Token::Seed => "seed",
            Token::MethodDir => "`{method}_k{K}` directory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("`{0}` does not follow any known dataset naming convention")]
    UnrecognizedName(String),
    #[error("cannot locate {token} in `{name}`")]
    MissingToken { token: Token, name: String },
    #[error("{token} token `{value}` in `{name}` is not valid")]
    InvalidToken {
        token: Token,
        value: String,
        name: String,
    },
}

impl ParseError {
    fn missing(token: Token, path: &Path) -> Self {
        ParseError::MissingToken {
            token,
            name: path.display().to_string(),
        }
    }

    fn invalid(token: Token, value: &str, path: &Path) -> Self {
        ParseError::InvalidToken {
            token,
            value: value.to_string(),
            name: path.display().to_string(),
        }
    }
}

/// One naming convention.
///
/// `Ok(None)` means the path does not have this convention's shape and the
/// next matcher should be tried. `Err` means the shape matched but a required
/// token is absent or unreadable.
pub trait PathMatcher: Send + Sync {
    fn convention(&self) -> Convention;
    fn try_match(&self, path: &Path) -> Result<Option<ParsedPath>, ParseError>;
}

/// Ordered matcher chain
pub struct PathParser {
    matchers: Vec<Box<dyn PathMatcher>>,
}

impl Default for PathParser {
    fn default() -> Self {
        Self::new(vec![
            Box::new(HierarchicalMatcher),
            Box::new(ClusteredFilenameMatcher),
            Box::new(FlatFilenameMatcher),
        ])
    }
}

impl PathParser {
    pub fn new(matchers: Vec<Box<dyn PathMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn parse(&self, path: &Path) -> Result<ParsedPath, ParseError> {
        for matcher in &self.matchers {
            if let Some(parsed) = matcher.try_match(path)? {
                trace!("{:?} layout matched {}", matcher.convention(), path.display());
                return Ok(parsed);
            }
        }
        Err(ParseError::UnrecognizedName(path.display().to_string()))
    }
}

/// Parse with the default chain.
pub fn parse_path(path: &Path) -> Result<ParsedPath, ParseError> {
    PathParser::default().parse(path)
}

/// `{N}_classes/{combo}/noise_{X}/seed_{Y}/...`, optionally followed by
/// `clustering/{method}_k{K}/...` for clustering outputs.
pub struct HierarchicalMatcher;

impl PathMatcher for HierarchicalMatcher {
    fn convention(&self) -> Convention {
        Convention::Hierarchical
    }

    fn try_match(&self, path: &Path) -> Result<Option<ParsedPath>, ParseError> {
        let segments: Vec<&str> = path.iter().filter_map(|s| s.to_str()).collect();
        let Some((pos, class_count)) = segments
            .iter()
            .enumerate()
            .find_map(|(i, s)| class_dir_count(s).map(|n| (i, n)))
        else {
            return Ok(None);
        };

        // {combo}/noise_{X}/seed_{Y} must follow, otherwise another layout may apply
        let (Some(combo), Some(noise_dir), Some(seed_dir)) = (
            segments.get(pos + 1),
            segments.get(pos + 2),
            segments.get(pos + 3),
        ) else {
            return Ok(None);
        };
        let (Some(noise_text), Some(seed_text)) = (
            prefixed_value(noise_dir, NOISE_MARKER),
            prefixed_value(seed_dir, "seed"),
        ) else {
            return Ok(None);
        };

        let result = match &segments[pos + 4..] {
            [file] if *file == HIERARCHICAL_FILE => None,
            [clustering, dir, file]
                if *clustering == CLUSTERING_DIR && file.ends_with(CLUSTERED_EXT) =>
            {
                Some(
                    parse_method_dir(dir)
                        .ok_or_else(|| ParseError::invalid(Token::MethodDir, dir, path))?,
                )
            }
            _ => return Ok(None),
        };

        let noise_level = parse_noise(noise_text, path)?;
        let seed = parse_seed(seed_text, path)?;

        Ok(Some(ParsedPath {
            params: DatasetParams {
                class_count,
                function_combo: normalize_combo(combo),
                noise_level,
                seed,
            },
            convention: Convention::Hierarchical,
            result,
        }))
    }
}

/// `{noise}noise.{combo}.{R}reps.{seed}.tsv` inside a `{N}` directory
pub struct FlatFilenameMatcher;

impl PathMatcher for FlatFilenameMatcher {
    fn convention(&self) -> Convention {
        Convention::FlatFilename
    }

    fn try_match(&self, path: &Path) -> Result<Option<ParsedPath>, ParseError> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        if name.ends_with(CLUSTERED_EXT) || !name.contains(NOISE_MARKER) {
            return Ok(None);
        }
        let Some(stem) = name.strip_suffix(DATASET_EXT) else {
            return Ok(None);
        };

        let flat = parse_flat_stem(stem, path)?;
        let class_count = path
            .parent()
            .and_then(dir_class_count)
            .unwrap_or(flat.function_count);

        Ok(Some(flat.into_parsed(class_count, Convention::FlatFilename, None)))
    }
}

/// Flat filename with a `.clust` segment, stored under
/// `{N}/clustering/{method}_k{K}/`
pub struct ClusteredFilenameMatcher;

impl PathMatcher for ClusteredFilenameMatcher {
    fn convention(&self) -> Convention {
        Convention::ClusteredFilename
    }

    fn try_match(&self, path: &Path) -> Result<Option<ParsedPath>, ParseError> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        let Some(stem) = name.strip_suffix(CLUSTERED_EXT) else {
            return Ok(None);
        };

        let flat = parse_flat_stem(stem, path)?;

        let method_dir = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .ok_or_else(|| ParseError::missing(Token::MethodDir, path))?;
        let tag = parse_method_dir(method_dir)
            .ok_or_else(|| ParseError::invalid(Token::MethodDir, method_dir, path))?;

        // {N}/clustering/{method}_k{K}/file; tolerate a missing `clustering` level
        let mut dataset_dir = path.parent().and_then(Path::parent);
        if let Some(dir) = dataset_dir {
            if dir.file_name().and_then(|n| n.to_str()) == Some(CLUSTERING_DIR) {
                dataset_dir = dir.parent();
            }
        }
        let class_count = dataset_dir
            .and_then(dir_class_count)
            .unwrap_or(flat.function_count);

        Ok(Some(flat.into_parsed(
            class_count,
            Convention::ClusteredFilename,
            Some(tag),
        )))
    }
}

struct FlatStem {
    noise_level: f64,
    function_combo: String,
    function_count: usize,
    seed: u64,
}

impl FlatStem {
    fn into_parsed(
        self,
        class_count: usize,
        convention: Convention,
        result: Option<MethodTag>,
    ) -> ParsedPath {
        ParsedPath {
            params: DatasetParams {
                class_count,
                function_combo: self.function_combo,
                noise_level: self.noise_level,
                seed: self.seed,
            },
            convention,
            result,
        }
    }
}

/// Split a flat stem on `.`.
///
/// A noise value with a decimal point spans the first two tokens
/// (`0` + `04noise` is 0.04); without one it is the first token alone.
/// `{R}reps` closes the function tokens and must be followed by exactly one
/// purely numeric seed token.
fn parse_flat_stem(stem: &str, path: &Path) -> Result<FlatStem, ParseError> {
    let tokens: Vec<&str> = stem.split('.').collect();

    let (noise_text, func_start) = if let Some(whole) = tokens[0].strip_suffix(NOISE_MARKER) {
        (whole.to_string(), 1)
    } else if let Some(frac) = tokens.get(1).and_then(|t| t.strip_suffix(NOISE_MARKER)) {
        (format!("{}.{}", tokens[0], frac), 2)
    } else {
        return Err(ParseError::missing(Token::Noise, path));
    };
    let noise_level = parse_noise(&noise_text, path)?;

    let rest = &tokens[func_start..];
    let reps_pos = rest
        .iter()
        .rposition(|t| is_reps_marker(t))
        .ok_or_else(|| ParseError::missing(Token::ReplicateCount, path))?;

    let seed = match &rest[reps_pos + 1..] {
        [] => return Err(ParseError::missing(Token::Seed, path)),
        [single] => parse_seed(single, path)?,
        many => return Err(ParseError::invalid(Token::Seed, &many.join("."), path)),
    };

    let raw_combo = rest[..reps_pos].join(".");
    if raw_combo.is_empty() {
        return Err(ParseError::missing(Token::FunctionCombo, path));
    }
    let function_count = combo_tokens(&raw_combo).count();

    Ok(FlatStem {
        noise_level,
        function_combo: normalize_combo(&raw_combo),
        function_count,
        seed,
    })
}

fn parse_noise(text: &str, path: &Path) -> Result<f64, ParseError> {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ParseError::invalid(Token::Noise, text, path)),
    }
}

fn parse_seed(text: &str, path: &Path) -> Result<u64, ParseError> {
    if !is_digits(text) {
        return Err(ParseError::invalid(Token::Seed, text, path));
    }
    text.parse::<u64>()
        .map_err(|_| ParseError::invalid(Token::Seed, text, path))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn is_reps_marker(token: &str) -> bool {
    token.strip_suffix(REPS_MARKER).is_some_and(is_digits)
}

/// `noise_0.04` -> `0.04`
fn prefixed_value<'a>(segment: &'a str, prefix: &str) -> Option<&'a str> {
    segment
        .split_once('_')
        .filter(|(p, _)| *p == prefix)
        .map(|(_, rest)| rest)
}

/// `3_classes` -> 3
fn class_dir_count(segment: &str) -> Option<usize> {
    segment
        .strip_suffix("_classes")
        .filter(|n| is_digits(n))
        .and_then(|n| n.parse().ok())
}

fn dir_class_count(dir: &Path) -> Option<usize> {
    let name = dir.file_name()?.to_str()?;
    if is_digits(name) {
        name.parse().ok().filter(|&n| n > 0)
    } else {
        class_dir_count(name)
    }
}

/// `gmm_k3` -> (`gmm`, 3). Splits on the last `_k` so method names may
/// themselves contain one.
pub fn parse_method_dir(name: &str) -> Option<MethodTag> {
    let (method, k) = name.rsplit_once("_k")?;
    if method.is_empty() || !is_digits(k) {
        return None;
    }
    Some(MethodTag {
        method: method.to_string(),
        k: k.parse().ok()?,
    })
}

fn combo_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(['-', '.']).filter(|t| !t.is_empty())
}

/// Sort the function tokens so equivalent combinations share one key.
/// Hyphen-joined unless the raw combination only used dots.
pub fn normalize_combo(raw: &str) -> String {
    let separator = if raw.contains('.') && !raw.contains('-') {
        "."
    } else {
        "-"
    };
    let mut tokens: Vec<&str> = combo_tokens(raw).collect();
    tokens.sort_unstable();
    tokens.join(separator)
}
