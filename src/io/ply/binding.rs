//! Matching the properties of an element group against requested property
//! descriptors.

use std::{
    fmt,
    slice,
};

use log::{trace, warn};

use crate::prop::PropertyDescriptor;
use super::raw::{ElementDef, PropVec, PropertyType};


/// Whether one requested property was found in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub name: &'static str,

    /// The type of the property in the file, `None` if it is missing.
    pub disk_type: Option<PropertyType>,
}

impl Presence {
    pub fn is_present(&self) -> bool {
        self.disk_type.is_some()
    }
}

/// One [`Presence`] per requested property, in the order of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceFlags(Vec<Presence>);

impl PresenceFlags {
    /// Just the flags, parallel to the requested descriptors.
    pub fn flags(&self) -> Vec<bool> {
        self.0.iter().map(|p| p.is_present()).collect()
    }

    /// Returns `true` if a property called `name` was requested and found.
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).map(|p| p.is_present()).unwrap_or(false)
    }

    pub fn get(&self, name: &str) -> Option<&Presence> {
        self.0.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> slice::Iter<'_, Presence> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if at least one requested property was found.
    pub fn any(&self) -> bool {
        self.0.iter().any(|p| p.is_present())
    }
}

impl<'a> IntoIterator for &'a PresenceFlags {
    type Item = &'a Presence;
    type IntoIter = slice::Iter<'a, Presence>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The result of [`negotiate`].
#[derive(Debug)]
pub(crate) struct Binding<'a, F> {
    /// For each property of the element group (in file order): the
    /// descriptor its value is stored with, or `None` if the value is
    /// dropped.
    pub(crate) slots: PropVec<Option<&'a PropertyDescriptor<F>>>,
    pub(crate) presence: PresenceFlags,
}

/// Binds the properties of `def` to the `requested` descriptors by name.
///
/// If several file properties feed the same field (e.g. `red` and
/// `diffuse_red`), the first one in file order is used. The later one is
/// still marked as present, but its value is dropped. A property whose
/// list/scalar shape does not match the descriptor is treated as missing.
pub(crate) fn negotiate<'a, F>(
    def: &ElementDef,
    requested: &'a [PropertyDescriptor<F>],
) -> Binding<'a, F>
where
    F: Copy + fmt::Debug + PartialEq,
{
    let mut presence: Vec<_> = requested.iter()
        .map(|d| Presence { name: d.name, disk_type: None })
        .collect();
    let mut bound_fields: Vec<F> = Vec::with_capacity(requested.len());

    let slots = def.property_defs.iter().map(|prop| {
        let (i, d) = requested.iter().enumerate().find(|(_, d)| d.name == prop.name)?;

        if d.is_list() != prop.ty.is_list() {
            warn!(
                "property '{}' of element '{}' has type '{}', but a {} was expected: ignoring it",
                prop.name,
                def.name,
                prop.ty,
                if d.is_list() { "list" } else { "scalar" },
            );
            return None;
        }

        presence[i].disk_type = Some(prop.ty);

        if bound_fields.contains(&d.field) {
            trace!("'{}.{}' is shadowed by an earlier alias", def.name, prop.name);
            return None;
        }
        bound_fields.push(d.field);

        trace!("bound '{}.{}' ({}) to {:?}", def.name, prop.name, prop.ty, d.field);
        Some(d)
    }).collect::<Vec<_>>();

    Binding {
        slots: slots.into(),
        presence: PresenceFlags(presence),
    }
}
