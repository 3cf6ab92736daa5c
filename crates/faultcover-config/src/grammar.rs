//! Type and domain grammar.
//!
//! A type nests by naming a container and opening a parenthesis that is
//! never closed: `list(dict(int:str(abc`. The string alphabet is whatever
//! follows `str(`. Dict key and value types are split at the first `:`.
//!
//! Domains follow the same shape. Each container level contributes its
//! size domain before the `(`, and dict levels split key and value domains
//! at the first `:` after it:
//!
//! ```text
//! type:        dict(tuple(bool:set(int
//! exhaustive:  0~1(1~2(0~1:2~3(3~4
//! ```
//!
//! A single domain is either an inclusive integer range `lower~upper` or an
//! explicit list `[v1, v2, ...]`.

use faultcover_gen::{GenNode, Number};

use crate::parse::ConfigError;

/// Largest number of entries a `lower~upper` range may expand to.
pub const MAX_RANGE_LEN: u64 = 1_000_000;

/// How the entries of one domain are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Bool,
    Int,
    Float,
    Size,
}

/// Build the generator node for one parameter.
pub fn parse_node(ty: &str, exhaustive: &str, random: &str) -> Result<GenNode, ConfigError> {
    let ty = ty.trim();
    let exhaustive = exhaustive.trim();
    let random = random.trim();

    let Some((head, rest)) = ty.split_once('(') else {
        let node = match ty {
            "bool" => GenNode::bool(
                parse_domain(exhaustive, EntryKind::Bool)?,
                parse_domain(random, EntryKind::Bool)?,
            )?,
            "int" => GenNode::int(
                parse_domain(exhaustive, EntryKind::Int)?,
                parse_domain(random, EntryKind::Int)?,
            )?,
            "float" => GenNode::float(
                parse_domain(exhaustive, EntryKind::Float)?,
                parse_domain(random, EntryKind::Float)?,
            )?,
            _ => return Err(ConfigError::UnknownType(ty.to_string())),
        };
        return Ok(node);
    };

    let head = head.trim();
    let rest = rest.trim();
    match head {
        "str" => Ok(GenNode::string(
            rest,
            parse_domain(exhaustive, EntryKind::Size)?,
            parse_domain(random, EntryKind::Size)?,
        )?),
        "list" | "tuple" | "set" => {
            let (ex_sizes, ex_child) = split_level(exhaustive, '(')?;
            let (ran_sizes, ran_child) = split_level(random, '(')?;
            let child = parse_node(rest, ex_child, ran_child)?;
            let ex_sizes = parse_domain(ex_sizes, EntryKind::Size)?;
            let ran_sizes = parse_domain(ran_sizes, EntryKind::Size)?;

            let node = match head {
                "list" => GenNode::list(child, ex_sizes, ran_sizes)?,
                "tuple" => GenNode::tuple(child, ex_sizes, ran_sizes)?,
                _ => {
                    require_hashable("set", &child)?;
                    GenNode::set(child, ex_sizes, ran_sizes)?
                }
            };
            Ok(node)
        }
        "dict" => {
            let (key_ty, value_ty) = split_level(rest, ':')?;
            let (ex_sizes, ex_children) = split_level(exhaustive, '(')?;
            let (ex_key, ex_value) = split_level(ex_children, ':')?;
            let (ran_sizes, ran_children) = split_level(random, '(')?;
            let (ran_key, ran_value) = split_level(ran_children, ':')?;

            let key = parse_node(key_ty, ex_key, ran_key)?;
            require_hashable("dict key", &key)?;
            let value = parse_node(value_ty, ex_value, ran_value)?;
            Ok(GenNode::dict(
                key,
                value,
                parse_domain(ex_sizes, EntryKind::Size)?,
                parse_domain(ran_sizes, EntryKind::Size)?,
            )?)
        }
        _ => Err(ConfigError::UnknownType(head.to_string())),
    }
}

/// Split at the first `separator`, trimming both halves.
fn split_level(text: &str, separator: char) -> Result<(&str, &str), ConfigError> {
    text.split_once(separator)
        .map(|(before, after)| (before.trim(), after.trim()))
        .ok_or_else(|| ConfigError::MissingSeparator {
            separator,
            text: text.to_string(),
        })
}

fn require_hashable(container: &'static str, child: &GenNode) -> Result<(), ConfigError> {
    if child.is_hashable() {
        Ok(())
    } else {
        Err(ConfigError::Unhashable {
            container,
            element: child.type_name(),
        })
    }
}

fn parse_domain(text: &str, kind: EntryKind) -> Result<Vec<Number>, ConfigError> {
    let text = text.trim();
    if let Some((lower, upper)) = text.split_once('~') {
        let lower = parse_int(lower)?;
        let upper = parse_int(upper)?;
        if upper < lower {
            return Err(ConfigError::ReversedRange { lower, upper });
        }
        if (upper as i128 - lower as i128) >= MAX_RANGE_LEN as i128 {
            return Err(ConfigError::RangeTooWide {
                lower,
                upper,
                max: MAX_RANGE_LEN,
            });
        }
        // Ranges are checked at their ends; every entry lies between them.
        check_entry(lower, kind)?;
        check_entry(upper, kind)?;
        let domain: Vec<Number> = match kind {
            EntryKind::Float => (lower..=upper).map(|i| Number::Float(i as f64)).collect(),
            _ => (lower..=upper).map(Number::Int).collect(),
        };
        return Ok(domain);
    }

    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| ConfigError::MalformedDomain(text.to_string()))?;
    inner
        .split(',')
        .map(|entry| parse_entry(entry.trim(), kind))
        .collect()
}

fn parse_entry(entry: &str, kind: EntryKind) -> Result<Number, ConfigError> {
    match kind {
        EntryKind::Float => entry
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ConfigError::InvalidNumber(entry.to_string())),
        _ => {
            let value = parse_int(entry)?;
            check_entry(value, kind)?;
            Ok(Number::Int(value))
        }
    }
}

fn check_entry(value: i64, kind: EntryKind) -> Result<(), ConfigError> {
    match kind {
        EntryKind::Bool if value != 0 && value != 1 => Err(ConfigError::InvalidBool(value)),
        EntryKind::Size if value < 0 => Err(ConfigError::NegativeSize(value)),
        _ => Ok(()),
    }
}

fn parse_int(text: &str) -> Result<i64, ConfigError> {
    let text = text.trim();
    text.parse::<i64>()
        .map_err(|_| ConfigError::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_domain() {
        assert_eq!(
            parse_domain("-2~2", EntryKind::Int).unwrap(),
            vec![
                Number::Int(-2),
                Number::Int(-1),
                Number::Int(0),
                Number::Int(1),
                Number::Int(2)
            ]
        );
        assert_eq!(
            parse_domain(" 3 ~ 3 ", EntryKind::Float).unwrap(),
            vec![Number::Float(3.0)]
        );
    }

    #[test]
    fn test_range_width_limit() {
        let widest = parse_domain("1~1000000", EntryKind::Int).unwrap();
        assert_eq!(widest.len() as u64, MAX_RANGE_LEN);
        assert!(matches!(
            parse_domain("0~1000000", EntryKind::Int),
            Err(ConfigError::RangeTooWide { lower: 0, upper: 1_000_000, .. })
        ));
    }

    #[test]
    fn test_list_domain() {
        assert_eq!(
            parse_domain("[-1.3, 2.2]", EntryKind::Float).unwrap(),
            vec![Number::Float(-1.3), Number::Float(2.2)]
        );
        assert_eq!(
            parse_domain("[ 4,0 ]", EntryKind::Size).unwrap(),
            vec![Number::Int(4), Number::Int(0)]
        );
    }

    #[test]
    fn test_domain_errors() {
        assert!(matches!(
            parse_domain("3~1", EntryKind::Int),
            Err(ConfigError::ReversedRange { lower: 3, upper: 1 })
        ));
        assert!(matches!(
            parse_domain("-1~2", EntryKind::Size),
            Err(ConfigError::NegativeSize(-1))
        ));
        assert!(matches!(
            parse_domain("0~2", EntryKind::Bool),
            Err(ConfigError::InvalidBool(2))
        ));
        assert!(matches!(
            parse_domain("[0, 1, 2.3]", EntryKind::Int),
            Err(ConfigError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_domain("[]", EntryKind::Int),
            Err(ConfigError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_domain("1, 2", EntryKind::Int),
            Err(ConfigError::MalformedDomain(_))
        ));
    }

    #[test]
    fn test_split_level() {
        assert_eq!(split_level(" 0~2 ( 1~3 ", '(').unwrap(), ("0~2", "1~3"));
        assert!(split_level("0~2 1~3", '(').is_err());
    }
}
