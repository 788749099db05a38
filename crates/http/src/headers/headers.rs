use std::borrow::Cow;
use std::mem;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use tracing::trace;

use crate::headers::policy::merge_values;
use crate::headers::token::is_token;
use crate::headers::{MergePolicy, MergedValue};
use crate::protocol::HeaderError;

/// Name of the header announcing which fields follow as trailers.
pub const TRAILER: &str = "trailer";

/// A single header field as it appeared on the wire.
///
/// The name keeps its original case; comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn into_parts(self) -> (String, String) {
        (self.name, self.value)
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for Field {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// An ordered collection of header fields with a lazily built merged index.
///
/// Fields are stored exactly as added. Lookups go through an index from
/// lower-cased name to [`MergedValue`], built on first access by folding every
/// field through the name's [`MergePolicy`] and dropped on any mutation.
///
/// A collection can carry a trailer boundary: fields added after
/// [`Headers::begin_trailer`] are trailers, which only exist once a chunked
/// body has been fully transferred.
///
/// # Example
///
/// ```
/// use micro_h1::headers::{Headers, MergedValue};
///
/// let mut headers = Headers::new();
/// headers.add("Accept", "text/html").unwrap();
/// headers.add("Accept", "application/json").unwrap();
/// headers.add("Content-Type", "text/plain").unwrap();
/// headers.add("Content-Type", "text/html").unwrap();
///
/// assert_eq!(headers.get("accept").unwrap(), Some(&MergedValue::list(["text/html", "application/json"])));
/// assert_eq!(headers.get("content-type").unwrap(), Some(&MergedValue::from("text/html")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: Vec<Field>,
    index: OnceCell<IndexMap<String, MergedValue>>,
    tail: Option<usize>,
    frozen: bool,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity), ..Self::default() }
    }

    /// Builds a collection from raw fields, validating each one.
    pub fn from_fields<I, F>(fields: I) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        let mut headers = Self::new();
        for field in fields {
            let field = field.into();
            validate(&field)?;
            headers.fields.push(field);
        }
        Ok(headers)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every field, trailers included, in arrival order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// The fields that precede the trailer boundary.
    pub fn header_fields(&self) -> &[Field] {
        &self.fields[..self.tail.unwrap_or(self.fields.len())]
    }

    /// Raw values of every field with the given name, in arrival order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().filter(move |f| f.is_named(name)).map(Field::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.is_named(name))
    }

    /// Appends a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), HeaderError> {
        self.ensure_mutable()?;
        let field = Field::new(name, value);
        validate(&field)?;
        self.fields.push(field);
        self.invalidate();
        Ok(())
    }

    /// Replaces every field of that name with a single new one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), HeaderError> {
        self.ensure_mutable()?;
        let field = Field::new(name, value);
        validate(&field)?;
        self.remove_where(|f| f.is_named(&field.name));
        self.fields.push(field);
        self.invalidate();
        Ok(())
    }

    /// Appends a field to the header section, ahead of any trailers.
    pub fn add_to_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), HeaderError> {
        self.ensure_mutable()?;
        let field = Field::new(name, value);
        validate(&field)?;
        match self.tail.as_mut() {
            Some(tail) => {
                self.fields.insert(*tail, field);
                *tail += 1;
            }
            None => self.fields.push(field),
        }
        self.invalidate();
        Ok(())
    }

    /// Removes every field of that name, returning their merged value.
    pub fn delete(&mut self, name: &str) -> Result<Option<MergedValue>, HeaderError> {
        self.ensure_mutable()?;
        let key = lower(name);
        let removed = self.remove_where(|f| f.is_named(&key));
        if removed.is_empty() {
            return Ok(None);
        }

        if let Some(index) = self.index.get_mut() {
            return Ok(index.shift_remove(&*key));
        }

        merge_values(&key, removed.iter().map(Field::value))
    }

    /// The merged value for a name.
    ///
    /// Builds the index on first use; fails when a field of *any* name can't
    /// be merged by its policy, e.g. an unparsable date.
    pub fn get(&self, name: &str) -> Result<Option<&MergedValue>, HeaderError> {
        let index = self.index()?;
        Ok(index.get(&*lower(name)))
    }

    /// Removes and returns the raw fields of every listed name.
    pub fn extract(&mut self, names: &[&str]) -> Result<Vec<Field>, HeaderError> {
        self.ensure_mutable()?;
        let removed = self.remove_where(|f| names.iter().any(|name| f.is_named(name)));
        if !removed.is_empty() {
            self.invalidate();
        }
        Ok(removed)
    }

    /// Returns a new collection with `other` applied on top of this one.
    pub fn merge(&self, other: &Headers) -> Result<Headers, HeaderError> {
        let mut merged = self.duplicate();
        merged.merge_from(other)?;
        Ok(merged)
    }

    /// Applies every field of `other`: names whose policy
    /// [replaces](MergePolicy::replaces) are `set`, the rest are `add`ed.
    pub fn merge_from(&mut self, other: &Headers) -> Result<(), HeaderError> {
        self.ensure_mutable()?;
        for field in &other.fields {
            if MergePolicy::for_name(&field.name).replaces() {
                self.set(field.name.clone(), field.value.clone())?;
            } else {
                self.add(field.name.clone(), field.value.clone())?;
            }
        }
        Ok(())
    }

    /// Marks the trailer boundary at the current end of the fields.
    ///
    /// Everything added afterwards is a trailer. Calling it again keeps the
    /// original boundary.
    pub fn begin_trailer(&mut self) -> Result<std::slice::Iter<'_, Field>, HeaderError> {
        self.ensure_mutable()?;
        if self.tail.is_none() {
            trace!(offset = self.fields.len(), "begin trailer");
            self.tail = Some(self.fields.len());
        }
        Ok(self.trailer())
    }

    /// The trailer fields, empty when no boundary was marked.
    pub fn trailer(&self) -> std::slice::Iter<'_, Field> {
        match self.tail {
            Some(tail) => self.fields[tail..].iter(),
            None => [].iter(),
        }
    }

    pub fn has_trailer(&self) -> bool {
        self.tail.is_some()
    }

    /// Folds trailers into the ordinary fields and drops the `trailer`
    /// announcement.
    pub fn flatten_in_place(&mut self) -> Result<(), HeaderError> {
        self.ensure_mutable()?;
        self.flatten_unchecked();
        Ok(())
    }

    /// Non-destructive variant of [`Headers::flatten_in_place`].
    pub fn flatten(&self) -> Headers {
        let mut flattened = self.duplicate();
        flattened.flatten_unchecked();
        flattened
    }

    fn flatten_unchecked(&mut self) {
        self.remove_where(|f| f.is_named(TRAILER));
        self.tail = None;
        self.invalidate();
    }

    /// Materializes the index and forbids any further mutation.
    pub fn freeze(&mut self) -> Result<(), HeaderError> {
        if !self.frozen {
            self.index()?;
            self.frozen = true;
        }
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// A mutable deep copy, even of a frozen collection.
    pub fn duplicate(&self) -> Headers {
        Headers { frozen: false, ..self.clone() }
    }

    /// The merged view of every name, in first-arrival order.
    pub fn to_mapping(&self) -> Result<IndexMap<String, MergedValue>, HeaderError> {
        Ok(self.index()?.clone())
    }

    fn index(&self) -> Result<&IndexMap<String, MergedValue>, HeaderError> {
        self.index.get_or_try_init(|| build_index(&self.fields))
    }

    fn ensure_mutable(&self) -> Result<(), HeaderError> {
        if self.frozen {
            return Err(HeaderError::Frozen);
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.index.take();
    }

    /// Removes matching fields, keeping the trailer boundary in place.
    fn remove_where<P>(&mut self, mut predicate: P) -> Vec<Field>
    where
        P: FnMut(&Field) -> bool,
    {
        let fields = mem::take(&mut self.fields);
        let mut removed = Vec::new();
        let mut removed_before_tail = 0;

        for (position, field) in fields.into_iter().enumerate() {
            if predicate(&field) {
                if self.tail.is_some_and(|tail| position < tail) {
                    removed_before_tail += 1;
                }
                removed.push(field);
            } else {
                self.fields.push(field);
            }
        }

        if let Some(tail) = self.tail.as_mut() {
            *tail -= removed_before_tail;
        }
        removed
    }
}

fn build_index(fields: &[Field]) -> Result<IndexMap<String, MergedValue>, HeaderError> {
    let mut index: IndexMap<String, MergedValue> = IndexMap::with_capacity(fields.len());
    for field in fields {
        let name = field.name.to_ascii_lowercase();
        let policy = MergePolicy::for_name(&name);
        match index.get_mut(&name) {
            Some(existing) => policy.merge_into(existing, &name, &field.value)?,
            None => {
                let merged = policy.parse(&name, &field.value)?;
                index.insert(name, merged);
            }
        }
    }
    Ok(index)
}

fn validate(field: &Field) -> Result<(), HeaderError> {
    if !is_token(&field.name) {
        return Err(HeaderError::InvalidName { name: field.name.clone() });
    }
    if field.value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
        return Err(HeaderError::invalid_value(&field.name, "value contains CR, LF or NUL"));
    }
    Ok(())
}

fn lower(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

impl PartialEq for Headers {
    /// Collections are equal when their merged views are; when either can't
    /// be merged the raw fields are compared instead.
    fn eq(&self, other: &Self) -> bool {
        match (self.index(), other.index()) {
            (Ok(this), Ok(that)) => this == that,
            _ => self.fields == other.fields,
        }
    }
}

impl PartialEq<IndexMap<String, MergedValue>> for Headers {
    fn eq(&self, other: &IndexMap<String, MergedValue>) -> bool {
        self.index().is_ok_and(|index| index == other)
    }
}

impl PartialEq<[Field]> for Headers {
    fn eq(&self, other: &[Field]) -> bool {
        self.fields == other
    }
}

impl PartialEq<Vec<Field>> for Headers {
    fn eq(&self, other: &Vec<Field>) -> bool {
        &self.fields == other
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
