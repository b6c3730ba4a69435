//! Positional destructuring assignment.
//!
//! [`unpack`] binds every element of a finite sequence to a target list of the
//! same length. Targets are names, discard markers, or nested target lists that
//! recurse into the element at their position. The result is either the full
//! set of [`Bindings`] or an [`ArityMismatch`]; nothing is bound on failure, so
//! callers commit the bindings only after the whole operation has succeeded.

use thiserror::Error;
use tracing::debug;

/// Where an element ends up
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// Bind the element to this name
    Name(String),
    /// Read the element, bind nothing
    Discard,
    /// Unpack the element itself against these targets
    Nested(Vec<Target>),
}

impl Target {
    pub fn name(name: &str) -> Self {
        Target::Name(String::from(name))
    }

    pub fn nested<I: IntoIterator<Item = Target>>(targets: I) -> Self {
        Target::Nested(targets.into_iter().collect())
    }

    /// Names this target would bind, in binding order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Target::Name(name) => vec![name.as_str()],
            Target::Discard => vec![],
            Target::Nested(targets) => targets.iter().flat_map(|t| t.names()).collect(),
        }
    }

    pub fn print(&self) -> String {
        match self {
            Target::Name(name) => name.clone(),
            Target::Discard => String::from("_"),
            Target::Nested(targets) => {
                if targets.is_empty() {
                    String::from("(targets)")
                } else {
                    format!("(targets {})", crate::bulk_print!(targets, " "))
                }
            }
        }
    }
}

/// A value that may be a finite, positionally addressable sequence.
pub trait Sequence: Clone {
    /// The elements in order, or `None` when the value is not a sequence
    fn elements(&self) -> Option<Vec<Self>>;

    /// Type name used in error messages
    fn type_name(&self) -> &'static str;
}

/// What was found where `expected` elements were needed
#[derive(Clone, Debug, PartialEq)]
pub enum Found {
    Len(usize),
    NotASequence(&'static str),
}

/// The only way an unpack can fail: the sequence does not have exactly as many
/// elements as there are targets, at the top level or at some nested level.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{}{}", problem(.expected, .found), location(.path))]
pub struct ArityMismatch {
    pub expected: usize,
    pub found: Found,
    /// Positions leading from the top-level sequence to the failing one
    pub path: Vec<usize>,
}

impl ArityMismatch {
    /// Number of elements actually present, if the value was a sequence at all
    pub fn actual(&self) -> Option<usize> {
        match self.found {
            Found::Len(n) => Some(n),
            Found::NotASequence(_) => None,
        }
    }
}

fn problem(expected: &usize, found: &Found) -> String {
    match found {
        Found::Len(n) if n < expected => format!(
            "not enough values to unpack (expected {}, got {})",
            expected, n
        ),
        Found::Len(n) => format!("too many values to unpack (expected {}, got {})", expected, n),
        Found::NotASequence(type_name) => format!(
            "cannot unpack non-sequence {} (expected {} values)",
            type_name, expected
        ),
    }
}

fn location(path: &[usize]) -> String {
    if path.is_empty() {
        return String::new();
    }
    format!(
        " at position [{}]",
        path.iter()
            .map(|i| i.to_string())
            .collect::<Vec<String>>()
            .join(", ")
    )
}

/// Names bound by one successful unpack, in binding order.
///
/// Binding a name twice keeps the first position and the last value.
#[derive(Clone, Debug, PartialEq)]
pub struct Bindings<T> {
    entries: Vec<(String, T)>,
}

impl<T> Bindings<T> {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn bind(&mut self, name: &str, value: T) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((String::from(name), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for Bindings<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Unpacks `value` against `targets`, position by position.
pub fn unpack<T: Sequence>(value: &T, targets: &[Target]) -> Result<Bindings<T>, ArityMismatch> {
    let mut bindings = Bindings::new();
    unpack_into(value, targets, &mut vec![], &mut bindings)?;
    debug!(
        targets = targets.len(),
        bound = bindings.len(),
        "unpacked {}",
        value.type_name()
    );
    Ok(bindings)
}

/// Assigns `value` to a single target. A name takes the whole value, a
/// discard takes nothing, and a nested target list unpacks it.
pub fn assign<T: Sequence>(target: &Target, value: &T) -> Result<Bindings<T>, ArityMismatch> {
    match target {
        Target::Nested(targets) => unpack(value, targets),
        _ => {
            let mut bindings = Bindings::new();
            bind_target(target, value.clone(), &mut vec![], &mut bindings)?;
            Ok(bindings)
        }
    }
}

fn unpack_into<T: Sequence>(
    value: &T,
    targets: &[Target],
    path: &mut Vec<usize>,
    bindings: &mut Bindings<T>,
) -> Result<(), ArityMismatch> {
    let elements = match value.elements() {
        Some(elements) => elements,
        None => {
            debug!(expected = targets.len(), ?path, "cannot unpack {}", value.type_name());
            return Err(ArityMismatch {
                expected: targets.len(),
                found: Found::NotASequence(value.type_name()),
                path: path.clone(),
            });
        }
    };

    if elements.len() != targets.len() {
        debug!(
            expected = targets.len(),
            actual = elements.len(),
            ?path,
            "arity mismatch"
        );
        return Err(ArityMismatch {
            expected: targets.len(),
            found: Found::Len(elements.len()),
            path: path.clone(),
        });
    }

    for (i, (target, element)) in targets.iter().zip(elements).enumerate() {
        path.push(i);
        bind_target(target, element, path, bindings)?;
        path.pop();
    }
    Ok(())
}

fn bind_target<T: Sequence>(
    target: &Target,
    element: T,
    path: &mut Vec<usize>,
    bindings: &mut Bindings<T>,
) -> Result<(), ArityMismatch> {
    match target {
        Target::Name(name) => bindings.bind(name, element),
        Target::Discard => {}
        Target::Nested(targets) => unpack_into(&element, targets, path, bindings)?,
    }
    Ok(())
}
