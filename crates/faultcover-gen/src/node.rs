//! Generator node tree.
//!
//! A [`GenNode`] describes how to produce values for one parameter (or one
//! component of a nested parameter). Each node carries:
//! - an **exhaustive domain**, enumerated completely by
//!   [`GenNode::exhaustive_values`];
//! - a **random domain**, sampled by [`GenNode::random_value`];
//! - zero, one or two children, depending on its [`NodeKind`].
//!
//! For leaf kinds (Bool, Int, Float) domain entries are the literal values.
//! For containers (Str, List, Tuple, Set, Dict) domain entries are sizes and
//! the children govern the element values:
//! - **Str/List/Tuple**: ordered, repetition allowed (Cartesian power).
//! - **Set**: unordered, pairwise-distinct elements (combinations).
//! - **Dict**: pairwise-distinct keys, each paired with any value.
//!
//! Nodes are immutable once built. Constructors validate and deduplicate the
//! domains, so generation itself never fails or loops forever.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use faultcover_ir::{PyFloat, PyValue};
use rand::Rng;

/// A numeric domain entry.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(x) => x,
        }
    }

    /// The integer this entry denotes, if it is integral.
    pub fn as_integral(self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 => Some(x as i64),
            Number::Float(_) => None,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => PyFloat::new(*a) == PyFloat::new(*b),
            _ => false,
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(value.into())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{}", PyFloat::new(*x)),
        }
    }
}

/// Which of a node's two domains an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainRole {
    Exhaustive,
    Random,
}

impl fmt::Display for DomainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainRole::Exhaustive => f.write_str("exhaustive"),
            DomainRole::Random => f.write_str("random"),
        }
    }
}

/// Errors building a generator node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("{role} domain of {node} node is empty")]
    EmptyDomain { node: String, role: DomainRole },

    #[error("{role} domain of {node} node has negative size {size}")]
    NegativeSize {
        node: String,
        role: DomainRole,
        size: i64,
    },

    #[error("{role} domain of {node} node has non-integral entry {value}")]
    NonIntegral {
        node: String,
        role: DomainRole,
        value: Number,
    },

    #[error("{role} domain of bool node has negative entry {value}")]
    NegativeBool { role: DomainRole, value: Number },

    #[error("str node has an empty alphabet")]
    EmptyAlphabet,

    #[error(
        "{role} domain of {node} node asks for {size} distinct elements \
         but its child can only produce {available}"
    )]
    NotEnoughDistinct {
        node: String,
        role: DomainRole,
        size: usize,
        available: u128,
    },
}

/// The shape of a generator node and its children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Bool,
    Int,
    Float,
    /// A string over a fixed character alphabet (the Char leaf).
    Str { alphabet: Vec<char> },
    List(Box<GenNode>),
    Tuple(Box<GenNode>),
    Set(Box<GenNode>),
    Dict {
        key: Box<GenNode>,
        value: Box<GenNode>,
    },
}

/// A configured, immutable generator node.
#[derive(Debug, Clone, PartialEq)]
pub struct GenNode {
    kind: NodeKind,
    exhaustive: Vec<Number>,
    random: Vec<Number>,
    /// Leaf kinds only: the values each domain maps to.
    exhaustive_leaves: BTreeSet<PyValue>,
    random_leaves: BTreeSet<PyValue>,
}

impl GenNode {
    pub fn bool<E, R>(exhaustive: E, random: R) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        Self::build(NodeKind::Bool, collect(exhaustive), collect(random))
    }

    pub fn int<E, R>(exhaustive: E, random: R) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        Self::build(NodeKind::Int, collect(exhaustive), collect(random))
    }

    pub fn float<E, R>(exhaustive: E, random: R) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        Self::build(NodeKind::Float, collect(exhaustive), collect(random))
    }

    /// A string node; `alphabet` lists the characters strings are made of.
    pub fn string<E, R>(alphabet: &str, exhaustive: E, random: R) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        let mut chars: Vec<char> = Vec::new();
        for c in alphabet.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        if chars.is_empty() {
            return Err(NodeError::EmptyAlphabet);
        }
        Self::build(
            NodeKind::Str { alphabet: chars },
            collect(exhaustive),
            collect(random),
        )
    }

    pub fn list<E, R>(child: GenNode, exhaustive: E, random: R) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        Self::build(
            NodeKind::List(Box::new(child)),
            collect(exhaustive),
            collect(random),
        )
    }

    pub fn tuple<E, R>(child: GenNode, exhaustive: E, random: R) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        Self::build(
            NodeKind::Tuple(Box::new(child)),
            collect(exhaustive),
            collect(random),
        )
    }

    pub fn set<E, R>(child: GenNode, exhaustive: E, random: R) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        Self::build(
            NodeKind::Set(Box::new(child)),
            collect(exhaustive),
            collect(random),
        )
    }

    pub fn dict<E, R>(
        key: GenNode,
        value: GenNode,
        exhaustive: E,
        random: R,
    ) -> Result<Self, NodeError>
    where
        E: IntoIterator,
        E::Item: Into<Number>,
        R: IntoIterator,
        R::Item: Into<Number>,
    {
        Self::build(
            NodeKind::Dict {
                key: Box::new(key),
                value: Box::new(value),
            },
            collect(exhaustive),
            collect(random),
        )
    }

    fn build(
        kind: NodeKind,
        exhaustive: Vec<Number>,
        random: Vec<Number>,
    ) -> Result<Self, NodeError> {
        let mut node = Self {
            kind,
            exhaustive: dedup(exhaustive),
            random: dedup(random),
            exhaustive_leaves: BTreeSet::new(),
            random_leaves: BTreeSet::new(),
        };
        node.validate(DomainRole::Exhaustive)?;
        node.validate(DomainRole::Random)?;

        if matches!(node.kind, NodeKind::Bool | NodeKind::Int | NodeKind::Float) {
            let exhaustive = node.exhaustive.iter().map(|&n| node.leaf_value(n)).collect();
            let random = node.random.iter().map(|&n| node.leaf_value(n)).collect();
            node.exhaustive_leaves = exhaustive;
            node.random_leaves = random;
        }
        Ok(node)
    }

    fn validate(&self, role: DomainRole) -> Result<(), NodeError> {
        let domain = self.domain(role);
        if domain.is_empty() {
            return Err(NodeError::EmptyDomain {
                node: self.type_name(),
                role,
            });
        }

        match &self.kind {
            NodeKind::Float => {}
            NodeKind::Bool => {
                for &value in domain {
                    if value.as_f64() < 0.0 {
                        return Err(NodeError::NegativeBool { role, value });
                    }
                }
            }
            NodeKind::Int => {
                for &value in domain {
                    if value.as_integral().is_none() {
                        return Err(NodeError::NonIntegral {
                            node: self.type_name(),
                            role,
                            value,
                        });
                    }
                }
            }
            kind => {
                let mut largest = 0usize;
                for &value in domain {
                    let size = value.as_integral().ok_or_else(|| NodeError::NonIntegral {
                        node: self.type_name(),
                        role,
                        value,
                    })?;
                    if size < 0 {
                        return Err(NodeError::NegativeSize {
                            node: self.type_name(),
                            role,
                            size,
                        });
                    }
                    largest = largest.max(size as usize);
                }

                // Random draws resample on collision, so every random size
                // must be reachable. Oversized exhaustive sizes just
                // enumerate nothing.
                let distinct_child = match kind {
                    NodeKind::Set(child) => Some(child),
                    NodeKind::Dict { key, .. } => Some(key),
                    _ => None,
                };
                if let (DomainRole::Random, Some(child)) = (role, distinct_child) {
                    let available = child.count(role);
                    if largest as u128 > available {
                        return Err(NodeError::NotEnoughDistinct {
                            node: self.type_name(),
                            role,
                            size: largest,
                            available,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn exhaustive_domain(&self) -> &[Number] {
        &self.exhaustive
    }

    pub fn random_domain(&self) -> &[Number] {
        &self.random
    }

    pub fn domain(&self, role: DomainRole) -> &[Number] {
        match role {
            DomainRole::Exhaustive => &self.exhaustive,
            DomainRole::Random => &self.random,
        }
    }

    /// The element child of a sequence or set node, or the key child of a dict.
    pub fn left_child(&self) -> Option<&GenNode> {
        match &self.kind {
            NodeKind::List(child) | NodeKind::Tuple(child) | NodeKind::Set(child) => Some(child),
            NodeKind::Dict { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The value child of a dict.
    pub fn right_child(&self) -> Option<&GenNode> {
        match &self.kind {
            NodeKind::Dict { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn alphabet(&self) -> Option<&[char]> {
        match &self.kind {
            NodeKind::Str { alphabet } => Some(alphabet),
            _ => None,
        }
    }

    /// Type spelling, e.g. `dict(int:list(str))`.
    pub fn type_name(&self) -> String {
        match &self.kind {
            NodeKind::Bool => "bool".to_string(),
            NodeKind::Int => "int".to_string(),
            NodeKind::Float => "float".to_string(),
            NodeKind::Str { .. } => "str".to_string(),
            NodeKind::List(child) => format!("list({})", child.type_name()),
            NodeKind::Tuple(child) => format!("tuple({})", child.type_name()),
            NodeKind::Set(child) => format!("set({})", child.type_name()),
            NodeKind::Dict { key, value } => {
                format!("dict({}:{})", key.type_name(), value.type_name())
            }
        }
    }

    /// Whether values of this node could be Python set elements or dict keys.
    pub fn is_hashable(&self) -> bool {
        match &self.kind {
            NodeKind::List(_) | NodeKind::Set(_) | NodeKind::Dict { .. } => false,
            NodeKind::Tuple(child) => child.is_hashable(),
            _ => true,
        }
    }

    /// Number of distinct values `exhaustive_values` returns.
    pub fn exhaustive_count(&self) -> u128 {
        self.count(DomainRole::Exhaustive)
    }

    /// Number of distinct values `random_value` can return.
    pub fn random_count(&self) -> u128 {
        self.count(DomainRole::Random)
    }

    fn count(&self, role: DomainRole) -> u128 {
        match &self.kind {
            NodeKind::Bool | NodeKind::Int | NodeKind::Float => self.leaves(role).len() as u128,
            NodeKind::Str { alphabet } => self
                .sizes(role)
                .into_iter()
                .map(|s| saturating_pow(alphabet.len() as u128, s))
                .fold(0, u128::saturating_add),
            NodeKind::List(child) | NodeKind::Tuple(child) => {
                let c = child.count(role);
                self.sizes(role)
                    .into_iter()
                    .map(|s| saturating_pow(c, s))
                    .fold(0, u128::saturating_add)
            }
            NodeKind::Set(child) => {
                let c = child.count(role);
                self.sizes(role)
                    .into_iter()
                    .map(|s| binomial(c, s))
                    .fold(0, u128::saturating_add)
            }
            NodeKind::Dict { key, value } => {
                let k = key.count(role);
                let v = value.count(role);
                self.sizes(role)
                    .into_iter()
                    .map(|s| binomial(k, s).saturating_mul(saturating_pow(v, s)))
                    .fold(0, u128::saturating_add)
            }
        }
    }

    /// Whether `value` is one of the values the given domain can yield:
    /// `exhaustive_values` for the exhaustive role, the support of
    /// `random_value` for the random role.
    pub fn can_produce(&self, role: DomainRole, value: &PyValue) -> bool {
        match (&self.kind, value) {
            (NodeKind::Bool | NodeKind::Int | NodeKind::Float, _) => {
                self.leaves(role).contains(value)
            }
            (NodeKind::Str { alphabet }, PyValue::Str(text)) => {
                self.sizes(role).contains(&text.chars().count())
                    && text.chars().all(|c| alphabet.contains(&c))
            }
            (NodeKind::List(child), PyValue::List(items))
            | (NodeKind::Tuple(child), PyValue::Tuple(items)) => {
                self.sizes(role).contains(&items.len())
                    && items.iter().all(|item| child.can_produce(role, item))
            }
            (NodeKind::Set(child), PyValue::Set(items)) => {
                self.sizes(role).contains(&items.len())
                    && items.iter().all(|item| child.can_produce(role, item))
            }
            (NodeKind::Dict { key, value: val }, PyValue::Dict(entries)) => {
                self.sizes(role).contains(&entries.len())
                    && entries
                        .iter()
                        .all(|(k, v)| key.can_produce(role, k) && val.can_produce(role, v))
            }
            _ => false,
        }
    }

    /// Every value obtainable within the exhaustive domain.
    pub fn exhaustive_values(&self) -> BTreeSet<PyValue> {
        let role = DomainRole::Exhaustive;
        match &self.kind {
            NodeKind::Bool | NodeKind::Int | NodeKind::Float => self.exhaustive_leaves.clone(),
            NodeKind::Str { alphabet } => self
                .sizes(role)
                .into_iter()
                .flat_map(|s| sequences(alphabet.as_slice(), s))
                .map(|chars| PyValue::Str(chars.into_iter().collect()))
                .collect(),
            NodeKind::List(child) => {
                let elements: Vec<PyValue> = child.exhaustive_values().into_iter().collect();
                self.sizes(role)
                    .into_iter()
                    .flat_map(|s| sequences(elements.as_slice(), s))
                    .map(PyValue::List)
                    .collect()
            }
            NodeKind::Tuple(child) => {
                let elements: Vec<PyValue> = child.exhaustive_values().into_iter().collect();
                self.sizes(role)
                    .into_iter()
                    .flat_map(|s| sequences(elements.as_slice(), s))
                    .map(PyValue::Tuple)
                    .collect()
            }
            NodeKind::Set(child) => {
                let elements: Vec<PyValue> = child.exhaustive_values().into_iter().collect();
                self.sizes(role)
                    .into_iter()
                    .flat_map(|s| combinations(elements.as_slice(), s))
                    .map(|subset| PyValue::Set(subset.into_iter().collect()))
                    .collect()
            }
            NodeKind::Dict { key, value } => {
                let keys: Vec<PyValue> = key.exhaustive_values().into_iter().collect();
                let values: Vec<PyValue> = value.exhaustive_values().into_iter().collect();
                let mut out = BTreeSet::new();
                for s in self.sizes(role) {
                    for key_set in combinations(keys.as_slice(), s) {
                        for value_seq in sequences(values.as_slice(), s) {
                            let entries: BTreeMap<PyValue, PyValue> =
                                key_set.iter().cloned().zip(value_seq).collect();
                            out.insert(PyValue::Dict(entries));
                        }
                    }
                }
                out
            }
        }
    }

    /// One value sampled from the random domain.
    ///
    /// Containers first pick a size uniformly among the distinct random
    /// sizes, then draw elements from the child's random path. Sets and
    /// dict keys resample on collision.
    pub fn random_value<R: Rng + ?Sized>(&self, rng: &mut R) -> PyValue {
        match &self.kind {
            NodeKind::Bool | NodeKind::Int | NodeKind::Float => {
                let n = self.random[rng.gen_range(0..self.random.len())];
                self.leaf_value(n)
            }
            NodeKind::Str { alphabet } => {
                let size = self.random_size(rng);
                let text: String = (0..size)
                    .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                    .collect();
                PyValue::Str(text)
            }
            NodeKind::List(child) => {
                let size = self.random_size(rng);
                PyValue::List((0..size).map(|_| child.random_value(rng)).collect())
            }
            NodeKind::Tuple(child) => {
                let size = self.random_size(rng);
                PyValue::Tuple((0..size).map(|_| child.random_value(rng)).collect())
            }
            NodeKind::Set(child) => {
                let size = self.random_size(rng);
                let mut elements = BTreeSet::new();
                while elements.len() < size {
                    elements.insert(child.random_value(rng));
                }
                PyValue::Set(elements)
            }
            NodeKind::Dict { key, value } => {
                let size = self.random_size(rng);
                let mut entries = BTreeMap::new();
                while entries.len() < size {
                    let k = key.random_value(rng);
                    if !entries.contains_key(&k) {
                        let v = value.random_value(rng);
                        entries.insert(k, v);
                    }
                }
                PyValue::Dict(entries)
            }
        }
    }

    fn leaves(&self, role: DomainRole) -> &BTreeSet<PyValue> {
        match role {
            DomainRole::Exhaustive => &self.exhaustive_leaves,
            DomainRole::Random => &self.random_leaves,
        }
    }

    /// A size chosen uniformly among the distinct random sizes.
    fn random_size<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let sizes: Vec<usize> = self.sizes(DomainRole::Random).into_iter().collect();
        sizes[rng.gen_range(0..sizes.len())]
    }

    /// Distinct container sizes of a validated domain.
    fn sizes(&self, role: DomainRole) -> BTreeSet<usize> {
        self.domain(role)
            .iter()
            .filter_map(|n| n.as_integral())
            .map(|s| s as usize)
            .collect()
    }

    fn leaf_value(&self, n: Number) -> PyValue {
        match self.kind {
            NodeKind::Bool => PyValue::Bool(n.as_f64() > 0.0),
            NodeKind::Float => PyValue::float(n.as_f64()),
            _ => match n {
                Number::Int(i) => PyValue::Int(i),
                Number::Float(x) => PyValue::Int(x as i64),
            },
        }
    }
}

fn collect<I>(domain: I) -> Vec<Number>
where
    I: IntoIterator,
    I::Item: Into<Number>,
{
    domain.into_iter().map(Into::into).collect()
}

/// Drop repeated entries, keeping the first occurrence.
fn dedup(domain: Vec<Number>) -> Vec<Number> {
    #[derive(PartialEq, Eq, PartialOrd, Ord)]
    enum Key {
        Int(i64),
        Float(PyFloat),
    }

    let mut seen = BTreeSet::new();
    domain
        .into_iter()
        .filter(|&n| {
            seen.insert(match n {
                Number::Int(i) => Key::Int(i),
                Number::Float(x) => Key::Float(PyFloat::new(x)),
            })
        })
        .collect()
}

/// All length-`len` sequences over `items`, repetition allowed.
fn sequences<T: Clone>(items: &[T], len: usize) -> Vec<Vec<T>> {
    let mut out: Vec<Vec<T>> = vec![Vec::new()];
    for _ in 0..len {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                items.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect();
    }
    out
}

/// All size-`k` subsets of `items`, preserving input order within each.
fn combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k > n {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.iter().map(|&i| items[i].clone()).collect());

        // Advance the rightmost index that still has room.
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if indices[i] != i + n - k {
                break;
            }
        }
        indices[i] += 1;
        for j in (i + 1)..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

fn saturating_pow(base: u128, exp: usize) -> u128 {
    let mut acc: u128 = 1;
    for _ in 0..exp {
        acc = acc.saturating_mul(base);
        if acc == 0 || acc == u128::MAX {
            break;
        }
    }
    acc
}

/// C(n, k), saturating at `u128::MAX`.
fn binomial(n: u128, k: usize) -> u128 {
    let k = k as u128;
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is divisible by (i + 1) at every step.
        match acc.checked_mul(n - i) {
            Some(product) => acc = product / (i + 1),
            None => return u128::MAX,
        }
    }
    acc
}
