use crate::headers::{Field, Headers};
use crate::protocol::HeaderError;

/// Several [`Headers`] read as one ordered sequence, without copying.
///
/// Layers are visited in the order they were pushed, so a typical stack is
/// connection defaults first and per-message overrides last.
#[derive(Debug, Clone, Default)]
pub struct MergedHeaders<'a> {
    layers: Vec<&'a Headers>,
}

impl<'a> MergedHeaders<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn with(mut self, headers: &'a Headers) -> Self {
        self.layers.push(headers);
        self
    }

    pub fn push(&mut self, headers: &'a Headers) {
        self.layers.push(headers);
    }

    /// Every field of every layer as `(lower-cased name, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (String, &'a str)> + '_ {
        self.layers.iter().copied().flat_map(Headers::iter).map(|field| (field.name().to_ascii_lowercase(), field.value()))
    }

    /// The raw fields, original name case kept.
    pub fn fields(&self) -> impl Iterator<Item = &'a Field> + '_ {
        self.layers.iter().copied().flat_map(Headers::iter)
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(|headers| headers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|headers| headers.is_empty())
    }

    /// Copies every layer into a standalone collection, applying each layer on
    /// top of the previous with [`Headers::merge_from`].
    pub fn to_headers(&self) -> Result<Headers, HeaderError> {
        let mut headers = Headers::with_capacity(self.len());
        for layer in &self.layers {
            headers.merge_from(layer)?;
        }
        Ok(headers)
    }
}

impl<'a> FromIterator<&'a Headers> for MergedHeaders<'a> {
    fn from_iter<T: IntoIterator<Item = &'a Headers>>(iter: T) -> Self {
        Self { layers: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::MergedValue;

    #[test]
    fn layers_in_order() {
        let defaults = Headers::from_fields([("User-Agent", "micro"), ("Accept", "*/*")]).unwrap();
        let overrides = Headers::from_fields([("user-agent", "curl")]).unwrap();

        let merged = MergedHeaders::new().with(&defaults).with(&overrides);
        let seen: Vec<_> = merged.iter().collect();
        assert_eq!(
            seen,
            vec![
                ("user-agent".to_string(), "micro"),
                ("accept".to_string(), "*/*"),
                ("user-agent".to_string(), "curl"),
            ]
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.fields().next().map(Field::name), Some("User-Agent"));

        let headers = merged.to_headers().unwrap();
        assert_eq!(headers.get("user-agent").unwrap(), Some(&MergedValue::from("curl")));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn empty_layers() {
        let empty = Headers::new();
        let merged: MergedHeaders<'_> = [&empty, &empty].into_iter().collect();
        assert!(merged.is_empty());
        assert!(merged.to_headers().unwrap().is_empty());
    }
}
