//! Canonical channel numbering.
//!
//! Ordinary channels come first. Each special group follows in one
//! contiguous block, in the order the driver declares the groups. A
//! [`ChannelResolver`] turns a number or special name into the backing
//! array and index, and turns a number back into the id a user would type.

use rigmem_core::error::{AddressError, Result};
use rigmem_core::types::{ArrayKind, ChannelAddress, ChannelId, ChannelKind};

/// One block of named special channels backed by a single array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialGroup<K: ArrayKind> {
    pub array: K,
    pub kind: ChannelKind,
    pub names: Vec<String>,
    /// True if the array has a companion flag array (used/valid/skip bits).
    pub has_flags: bool,
}

impl<K: ArrayKind> SpecialGroup<K> {
    pub fn new<I, S>(array: K, kind: ChannelKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SpecialGroup {
            array,
            kind,
            names: names.into_iter().map(Into::into).collect(),
            has_flags: false,
        }
    }

    /// Mark the group as having a flag companion.
    pub fn with_flags(mut self) -> Self {
        self.has_flags = true;
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Maps canonical channel numbers and special names onto backing arrays.
///
/// ```
/// use rigmem_core::types::{ArrayKind, ChannelId, ChannelKind};
/// use rigmem_memory::{ChannelResolver, SpecialGroup};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Array { Memory, Call }
///
/// impl ArrayKind for Array {
///     fn name(&self) -> &'static str {
///         match self {
///             Array::Memory => "memory",
///             Array::Call => "call",
///         }
///     }
/// }
///
/// let resolver = ChannelResolver::new(Array::Memory, 1, 100)
///     .group(SpecialGroup::new(Array::Call, ChannelKind::Special, ["C1", "C2"]));
///
/// let addr = resolver.resolve(&ChannelId::from("C2")).unwrap();
/// assert_eq!((addr.array, addr.index, addr.number), (Array::Call, 1, 102));
/// assert_eq!(resolver.name_of(102).unwrap(), ChannelId::from("C2"));
/// ```
#[derive(Debug, Clone)]
pub struct ChannelResolver<K: ArrayKind> {
    regular: K,
    first: u32,
    last: u32,
    regular_flags: bool,
    groups: Vec<SpecialGroup<K>>,
}

impl<K: ArrayKind> ChannelResolver<K> {
    /// Ordinary channels `first..=last` backed by `regular`, index
    /// `number - first`.
    pub fn new(regular: K, first: u32, last: u32) -> Self {
        ChannelResolver {
            regular,
            first,
            last,
            regular_flags: false,
            groups: Vec::new(),
        }
    }

    /// Mark the regular array as having a flag companion.
    pub fn with_regular_flags(mut self) -> Self {
        self.regular_flags = true;
        self
    }

    /// Append a special group after every group declared so far.
    pub fn group(mut self, group: SpecialGroup<K>) -> Self {
        self.groups.push(group);
        self
    }

    pub fn regular_bounds(&self) -> (u32, u32) {
        (self.first, self.last)
    }

    pub fn groups(&self) -> &[SpecialGroup<K>] {
        &self.groups
    }

    /// Every special name, in canonical order.
    pub fn special_names(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.names.iter().map(String::as_str))
    }

    /// Highest canonical number.
    pub fn max_number(&self) -> u32 {
        self.last + self.groups.iter().map(|g| g.len() as u32).sum::<u32>()
    }

    /// All canonical numbers in order.
    pub fn numbers(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.max_number()
    }

    /// Whether `array` has a flag companion. Callers get `None` flags for
    /// arrays without one and must cope.
    pub fn has_flags(&self, array: K) -> bool {
        if array == self.regular {
            return self.regular_flags;
        }
        self.groups
            .iter()
            .find(|g| g.array == array)
            .is_some_and(|g| g.has_flags)
    }

    /// Locate a channel by number or special name.
    pub fn resolve(&self, id: &ChannelId) -> Result<ChannelAddress<K>> {
        match id {
            ChannelId::Name(name) => self.resolve_name(name),
            ChannelId::Number(number) => self.resolve_number(*number),
        }
    }

    /// The id a user would type for canonical number `number`: the number
    /// itself for ordinary channels, the special name otherwise.
    pub fn name_of(&self, number: u32) -> Result<ChannelId> {
        let addr = self.resolve_number(number)?;
        Ok(match addr.extended_name {
            Some(name) => ChannelId::Name(name),
            None => ChannelId::Number(number),
        })
    }

    fn resolve_name(&self, name: &str) -> Result<ChannelAddress<K>> {
        let mut offset = 0u32;
        for group in &self.groups {
            if let Some(pos) = group.names.iter().position(|n| n == name) {
                return Ok(ChannelAddress {
                    kind: group.kind,
                    array: group.array,
                    index: pos,
                    number: self.last + 1 + offset + pos as u32,
                    extended_name: Some(name.to_string()),
                });
            }
            offset += group.len() as u32;
        }
        Err(AddressError::UnknownChannel(name.to_string()).into())
    }

    fn resolve_number(&self, number: u32) -> Result<ChannelAddress<K>> {
        if number > self.last {
            let mut index = (number - self.last - 1) as usize;
            for group in &self.groups {
                if index < group.len() {
                    return Ok(ChannelAddress {
                        kind: group.kind,
                        array: group.array,
                        index,
                        number,
                        extended_name: Some(group.names[index].clone()),
                    });
                }
                index -= group.len();
            }
            return Err(AddressError::UnknownChannel(number.to_string()).into());
        }
        if number < self.first {
            return Err(AddressError::UnknownChannel(number.to_string()).into());
        }
        Ok(ChannelAddress {
            kind: ChannelKind::Regular,
            array: self.regular,
            index: (number - self.first) as usize,
            number,
            extended_name: None,
        })
    }
}
