use crate::error::{Error, Result};
use crate::value::{Document, Value};

/// An ordered sequence of BSON values.
///
/// On the wire an array is a document whose keys are the literal strings
/// "0", "1", ... in order; the conversions here are lossless exactly when
/// that holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Array {
    elements: Vec<Value>,
}

impl Array {
    pub fn new() -> Self {
        Array { elements: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Array {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, value: Value) {
        self.elements.push(value)
    }

    /// Positional insertion: `index` must be the next free slot.
    pub fn insert(&mut self, index: usize, value: Value) -> Result<()> {
        if index != self.elements.len() {
            return Err(Error::encoding(format!(
                "array index '{}' is out of order, expected '{}'",
                index,
                self.elements.len()
            )));
        }
        self.elements.push(value);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    /// Rebuilds an array from its document form.
    ///
    /// The document keys must be the consecutive integers starting at 0.
    pub fn from_document(doc: &Document) -> Result<Array> {
        let mut array = Array::with_capacity(doc.len());
        for (counter, (key, value)) in doc.iter().enumerate() {
            let index: usize = key
                .parse()
                .map_err(|_| Error::decoding("not a bson array"))?;
            if index != counter {
                return Err(Error::decoding("not a bson array"));
            }
            array.push(value.clone());
        }
        Ok(array)
    }

    /// The document form of this array, keys "0".."n-1".
    pub fn to_document(&self) -> Document {
        let mut buf = itoa::Buffer::new();
        self.elements
            .iter()
            .enumerate()
            .map(|(i, v)| (buf.format(i).to_owned(), v.clone()))
            .collect()
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array {
            elements: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Value>> for Array {
    fn from(elements: Vec<Value>) -> Self {
        Array { elements }
    }
}
