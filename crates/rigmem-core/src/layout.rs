//! Field-layout contract over a raw memory image.
//!
//! A clone-mode driver describes its memory map as a set of [`ArrayDef`]s,
//! each an array of fixed-size records described by a [`StructDef`]. The
//! [`MemoryImage`] hands out [`FieldView`] and [`FieldViewMut`] windows onto
//! one record, and fields are then read and written by name:
//!
//! ```
//! use rigmem_core::layout::{ArrayDef, FieldDef, FieldKind, MemoryImage, StructDef};
//!
//! static SLOT: StructDef = StructDef {
//!     name: "slot",
//!     size: 4,
//!     fields: &[
//!         FieldDef::new("used", 0, FieldKind::Bits { shift: 7, width: 1 }),
//!         FieldDef::new("step", 0, FieldKind::Bits { shift: 0, width: 4 }),
//!         FieldDef::new("freq", 1, FieldKind::Bcd { width: 3 }),
//!     ],
//! };
//! static SLOTS: ArrayDef = ArrayDef { name: "slots", offset: 0, count: 2, def: &SLOT };
//!
//! let mut image = MemoryImage::zeroed(8);
//! image.view_mut(&SLOTS, 1).unwrap().set("freq", 146_520).unwrap();
//! assert_eq!(image.as_bytes()[5..8], [0x14, 0x65, 0x20]);
//! assert_eq!(image.view(&SLOTS, 1).unwrap().get("freq").unwrap(), 146_520);
//! ```

use std::ops::Range;

use crate::error::{Error, Result};

/// How a field's bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Big-endian unsigned integer, 1 to 4 bytes wide.
    UInt { width: usize },
    /// Little-endian unsigned integer, 1 to 4 bytes wide.
    UIntLe { width: usize },
    /// `width` bits of the byte at the field offset, starting `shift` bits
    /// up from the least significant bit.
    Bits { shift: u8, width: u8 },
    /// Packed BCD, two digits per byte, most significant digit first.
    Bcd { width: usize },
    /// A raw byte run: character arrays and opaque blocks.
    Bytes { len: usize },
}

impl FieldKind {
    /// Number of bytes the field occupies.
    pub const fn byte_len(&self) -> usize {
        match *self {
            FieldKind::UInt { width } | FieldKind::UIntLe { width } | FieldKind::Bcd { width } => {
                width
            }
            FieldKind::Bits { .. } => 1,
            FieldKind::Bytes { len } => len,
        }
    }
}

/// One named field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    /// Byte offset from the start of the record.
    pub offset: usize,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, offset: usize, kind: FieldKind) -> Self {
        FieldDef { name, offset, kind }
    }

    fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.kind.byte_len()
    }
}

/// A fixed-size record made of named fields.
#[derive(Debug, PartialEq, Eq)]
pub struct StructDef {
    pub name: &'static str,
    pub size: usize,
    pub fields: &'static [FieldDef],
}

impl StructDef {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Result<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::Layout(format!("{} has no field {name}", self.name)))
    }

    /// Check that every field lies inside the record and every bit field
    /// fits its byte.
    pub fn validate(&self) -> Result<()> {
        for field in self.fields {
            if field.range().end > self.size {
                return Err(Error::Layout(format!(
                    "{}.{} extends past the {}-byte record",
                    self.name, field.name, self.size
                )));
            }
            match field.kind {
                FieldKind::Bits { shift, width } if width == 0 || shift + width > 8 => {
                    return Err(Error::Layout(format!(
                        "{}.{} bit range does not fit a byte",
                        self.name, field.name
                    )));
                }
                FieldKind::UInt { width } | FieldKind::UIntLe { width }
                    if width == 0 || width > 4 =>
                {
                    return Err(Error::Layout(format!(
                        "{}.{} integer width must be 1 to 4 bytes",
                        self.name, field.name
                    )));
                }
                FieldKind::Bcd { width } if width == 0 || width > 4 => {
                    return Err(Error::Layout(format!(
                        "{}.{} BCD width must be 1 to 4 bytes",
                        self.name, field.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// An array of records at a fixed position in the image.
#[derive(Debug, PartialEq, Eq)]
pub struct ArrayDef {
    pub name: &'static str,
    /// Byte offset of element 0.
    pub offset: usize,
    pub count: usize,
    pub def: &'static StructDef,
}

impl ArrayDef {
    /// Byte range of element `index`.
    pub fn element_range(&self, index: usize) -> Result<Range<usize>> {
        if index >= self.count {
            return Err(Error::Layout(format!(
                "{}[{index}] out of range (count {})",
                self.name, self.count
            )));
        }
        let start = self.offset + index * self.def.size;
        Ok(start..start + self.def.size)
    }

    /// One past the last byte of the array.
    pub fn end(&self) -> usize {
        self.offset + self.count * self.def.size
    }
}

/// The raw byte image of a radio's memory, owned for one download/upload
/// cycle and edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    data: Vec<u8>,
}

impl MemoryImage {
    pub fn new(data: Vec<u8>) -> Self {
        MemoryImage { data }
    }

    pub fn zeroed(len: usize) -> Self {
        Self::filled(len, 0)
    }

    pub fn filled(len: usize, byte: u8) -> Self {
        MemoryImage {
            data: vec![byte; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Borrow a byte range, failing if it runs past the image.
    pub fn slice(&self, range: Range<usize>) -> Result<&[u8]> {
        let len = self.data.len();
        self.data
            .get(range.clone())
            .ok_or_else(|| Error::Layout(format!("range {range:?} outside {len}-byte image")))
    }

    /// Mutably borrow a byte range, failing if it runs past the image.
    pub fn slice_mut(&mut self, range: Range<usize>) -> Result<&mut [u8]> {
        let len = self.data.len();
        self.data
            .get_mut(range.clone())
            .ok_or_else(|| Error::Layout(format!("range {range:?} outside {len}-byte image")))
    }

    /// Read-only view of element `index` of `array`.
    pub fn view(&self, array: &ArrayDef, index: usize) -> Result<FieldView<'_>> {
        let range = array.element_range(index)?;
        Ok(FieldView {
            def: array.def,
            data: self.slice(range)?,
        })
    }

    /// Mutable view of element `index` of `array`.
    pub fn view_mut(&mut self, array: &ArrayDef, index: usize) -> Result<FieldViewMut<'_>> {
        let range = array.element_range(index)?;
        Ok(FieldViewMut {
            def: array.def,
            data: self.slice_mut(range)?,
        })
    }
}

/// A read-only window onto one record.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    def: &'static StructDef,
    data: &'a [u8],
}

impl<'a> FieldView<'a> {
    /// Wrap a record-sized byte slice that did not come from a
    /// [`MemoryImage`] (a record read over the link, for instance).
    pub fn over(def: &'static StructDef, data: &'a [u8]) -> Result<Self> {
        if data.len() < def.size {
            return Err(Error::Layout(format!(
                "{} needs {} bytes, got {}",
                def.name,
                def.size,
                data.len()
            )));
        }
        Ok(FieldView {
            def,
            data: &data[..def.size],
        })
    }

    /// Read a numeric field (integer, bit field, or BCD).
    pub fn get(&self, name: &str) -> Result<u32> {
        read_numeric(self.def, self.data, self.def.field(name)?)
    }

    /// Read a one-bit flag.
    pub fn get_bool(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)? != 0)
    }

    /// Borrow the bytes of a field.
    pub fn bytes(&self, name: &str) -> Result<&'a [u8]> {
        let field = self.def.field(name)?;
        Ok(&self.data[field.range()])
    }

    /// The whole record.
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }
}

/// A mutable window onto one record.
#[derive(Debug)]
pub struct FieldViewMut<'a> {
    def: &'static StructDef,
    data: &'a mut [u8],
}

impl FieldViewMut<'_> {
    /// Wrap a record-sized mutable byte slice.
    pub fn over<'a>(def: &'static StructDef, data: &'a mut [u8]) -> Result<FieldViewMut<'a>> {
        if data.len() < def.size {
            return Err(Error::Layout(format!(
                "{} needs {} bytes, got {}",
                def.name,
                def.size,
                data.len()
            )));
        }
        Ok(FieldViewMut {
            def,
            data: &mut data[..def.size],
        })
    }

    pub fn get(&self, name: &str) -> Result<u32> {
        read_numeric(self.def, self.data, self.def.field(name)?)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)? != 0)
    }

    pub fn bytes(&self, name: &str) -> Result<&[u8]> {
        let field = self.def.field(name)?;
        Ok(&self.data[field.range()])
    }

    /// Write a numeric field. Values that do not fit the field are
    /// rejected rather than truncated.
    pub fn set(&mut self, name: &str, value: u32) -> Result<()> {
        let field = *self.def.field(name)?;
        let out_of_range = || {
            Error::Layout(format!(
                "value {value} does not fit {}.{}",
                self.def.name, field.name
            ))
        };
        match field.kind {
            FieldKind::UInt { width } => {
                if width < 4 && value >> (width * 8) != 0 {
                    return Err(out_of_range());
                }
                let bytes = value.to_be_bytes();
                self.data[field.range()].copy_from_slice(&bytes[4 - width..]);
            }
            FieldKind::UIntLe { width } => {
                if width < 4 && value >> (width * 8) != 0 {
                    return Err(out_of_range());
                }
                let bytes = value.to_le_bytes();
                self.data[field.range()].copy_from_slice(&bytes[..width]);
            }
            FieldKind::Bits { shift, width } => {
                let mask = (1u32 << width) - 1;
                if value > mask {
                    return Err(out_of_range());
                }
                let byte = &mut self.data[field.offset];
                *byte = (*byte & !((mask as u8) << shift)) | ((value as u8) << shift);
            }
            FieldKind::Bcd { width } => {
                if u64::from(value) >= 100u64.pow(width as u32) {
                    return Err(out_of_range());
                }
                let mut remaining = value;
                for i in (0..width).rev() {
                    let lo = remaining % 10;
                    let hi = (remaining / 10) % 10;
                    remaining /= 100;
                    self.data[field.offset + i] = ((hi << 4) | lo) as u8;
                }
            }
            FieldKind::Bytes { .. } => {
                return Err(Error::Layout(format!(
                    "{}.{} is a byte field",
                    self.def.name, field.name
                )));
            }
        }
        Ok(())
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<()> {
        self.set(name, u32::from(value))
    }

    /// Overwrite a byte field. `value` must be exactly the field's length.
    pub fn set_bytes(&mut self, name: &str, value: &[u8]) -> Result<()> {
        let field = *self.def.field(name)?;
        let range = field.range();
        if value.len() != range.len() {
            return Err(Error::Layout(format!(
                "{}.{} is {} bytes, got {}",
                self.def.name,
                field.name,
                range.len(),
                value.len()
            )));
        }
        self.data[range].copy_from_slice(value);
        Ok(())
    }

    /// Set every byte of the record to `byte`.
    pub fn fill(&mut self, byte: u8) {
        self.data.fill(byte);
    }

    pub fn raw(&self) -> &[u8] {
        self.data
    }

    pub fn as_view(&self) -> FieldView<'_> {
        FieldView {
            def: self.def,
            data: self.data,
        }
    }
}

fn read_numeric(def: &StructDef, data: &[u8], field: &FieldDef) -> Result<u32> {
    let bytes = &data[field.range()];
    match field.kind {
        FieldKind::UInt { .. } => Ok(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)),
        FieldKind::UIntLe { .. } => Ok(bytes
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32)),
        FieldKind::Bits { shift, width } => {
            let mask = (1u32 << width) - 1;
            Ok((bytes[0] as u32 >> shift) & mask)
        }
        FieldKind::Bcd { .. } => {
            let mut value = 0u32;
            for &b in bytes {
                let (hi, lo) = ((b >> 4) as u32, (b & 0x0F) as u32);
                if hi > 9 || lo > 9 {
                    return Err(Error::Layout(format!(
                        "{}.{} holds non-BCD byte {b:#04x}",
                        def.name, field.name
                    )));
                }
                value = value * 100 + hi * 10 + lo;
            }
            Ok(value)
        }
        FieldKind::Bytes { .. } => Err(Error::Layout(format!(
            "{}.{} is a byte field",
            def.name, field.name
        ))),
    }
}
