// Tue Jan 13 2026 - Alex

use crate::structure::alignment::{Alignment, ALIGN_16};
use crate::structure::{Field, StructureError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Size assumed for any type the lookup does not know.
pub const DEFAULT_TYPE_SIZE: usize = 4;
/// Host pointers are laid out as 64-bit.
pub const POINTER_SIZE: usize = 8;

const BASE_TYPE_SIZES: &[(&str, usize)] = &[
    ("float", 4),
    ("float2", 8),
    ("float3", 12),
    ("float4", 16),
    ("uint", 4),
    ("uint2", 8),
    ("uint3", 12),
    ("uint4", 16),
    ("int", 4),
    ("int2", 8),
    ("int3", 12),
    ("int4", 16),
    ("bool", 4),
    ("uint32_t", 4),
    ("int32_t", 4),
];

static MATRIX_DIMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)X(\d)").unwrap());
static TRAILING_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\[(\d+)\]$").unwrap());
static PACK_OFFSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^c(\d+)(?:\.([xyzw]))?$").unwrap());

/// Byte-size rules for both dialects.
pub struct SizeModel;

impl SizeModel {
    /// Drops namespace qualifiers and case: `REX::W32::XMFLOAT4` -> `xmfloat4`.
    pub fn normalize_type(type_name: &str) -> String {
        let (base, _) = Self::split_array(type_name);
        if let Some((rows, cols)) = Self::matrix_dims(base) {
            if base.to_uppercase().contains("XM") {
                return format!("xmfloat{}x{}", rows, cols);
            }
            return format!("float{}x{}", rows, cols);
        }
        last_segment(base).to_lowercase()
    }

    /// `(rows, cols)` for tokens like `float3x4` or `DirectX::XMFLOAT4X4`.
    pub fn matrix_dims(type_name: &str) -> Option<(usize, usize)> {
        let upper = last_segment(type_name).to_uppercase();
        let caps = MATRIX_DIMS.captures(&upper)?;
        let rows = caps[1].parse().ok()?;
        let cols = caps[2].parse().ok()?;
        Some((rows, cols))
    }

    pub fn base_size(normalized: &str) -> Option<usize> {
        BASE_TYPE_SIZES
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, size)| *size)
    }

    /// True for scalars, vectors and matrices; false for user-defined types.
    pub fn is_base_type(type_name: &str) -> bool {
        let (base, _) = Self::split_array(type_name);
        Self::matrix_dims(base).is_some() || Self::base_size(&Self::normalize_type(base)).is_some()
    }

    pub fn is_known_type(type_name: &str) -> bool {
        type_name.trim_end().ends_with('*') || Self::is_base_type(type_name)
    }

    /// Returns the byte size and whether the type was unknown, or `None` when
    /// the size does not fit in a `usize`.
    pub fn checked_field_size(type_name: &str, array_size: usize) -> Option<(usize, bool)> {
        let (base, parsed_array) = Self::split_array(type_name.trim());
        let count = array_size.max(1).checked_mul(parsed_array)?;

        if base.trim_end().ends_with('*') {
            return Some((POINTER_SIZE.checked_mul(count)?, false));
        }

        if let Some((rows, cols)) = Self::matrix_dims(base) {
            let element = rows.checked_mul(cols)?.checked_mul(4)?;
            return Some((element.checked_mul(count)?, false));
        }

        match Self::base_size(&Self::normalize_type(base)) {
            Some(size) => Some((size.checked_mul(count)?, false)),
            None => Some((DEFAULT_TYPE_SIZE.checked_mul(count)?, true)),
        }
    }

    /// Byte size and unknown-type flag, saturating at `usize::MAX`.
    pub fn field_size(type_name: &str, array_size: usize) -> (usize, bool) {
        Self::checked_field_size(type_name, array_size)
            .unwrap_or_else(|| (usize::MAX, !Self::is_known_type(type_name)))
    }

    /// Sum of field sizes. With `align_to_16` every field starts on a register
    /// boundary and the total is rounded up to one.
    pub fn struct_size(fields: &[Field], align_to_16: bool) -> usize {
        let register = Alignment::register();
        let mut total = 0usize;
        for field in fields {
            if align_to_16 {
                total = register.align(total);
            }
            total = total.saturating_add(field.size());
        }
        if align_to_16 {
            total = register.align(total);
        }
        total
    }

    /// Container size honouring `packoffset(cN.x)` tags. Untagged fields
    /// follow the previous one on a 4-byte boundary.
    pub fn packed_size(fields: &[Field]) -> Result<usize, StructureError> {
        let scalar = Alignment::scalar();
        let mut offset = 0usize;
        let mut max_offset = 0usize;

        for field in fields {
            match field.pack_offset() {
                Some(tag) => {
                    let tagged = Self::pack_offset_bytes(tag)?;
                    offset = offset.max(tagged);
                }
                None => offset = scalar.align(offset),
            }
            offset = offset.saturating_add(field.size());
            max_offset = max_offset.max(offset);
        }

        Ok(Alignment::register().align(max_offset))
    }

    /// Byte offset named by a `register.component` tag.
    pub fn pack_offset_bytes(tag: &str) -> Result<usize, StructureError> {
        let caps = PACK_OFFSET
            .captures(tag.trim())
            .ok_or_else(|| StructureError::InvalidPackOffset(tag.to_string()))?;
        let register: usize = caps[1]
            .parse()
            .map_err(|_| StructureError::InvalidPackOffset(tag.to_string()))?;
        let component = match caps.get(2).map(|m| m.as_str()) {
            Some("y") => 4,
            Some("z") => 8,
            Some("w") => 12,
            _ => 0,
        };
        register
            .checked_mul(ALIGN_16)
            .and_then(|bytes| bytes.checked_add(component))
            .ok_or_else(|| StructureError::InvalidPackOffset(tag.to_string()))
    }

    fn split_array(type_name: &str) -> (&str, usize) {
        if let Some(caps) = TRAILING_ARRAY.captures(type_name) {
            if let (Some(base), Ok(count)) = (caps.get(1), caps[2].parse::<usize>()) {
                return (base.as_str(), count.max(1));
            }
        }
        (type_name, 1)
    }
}

fn last_segment(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name).trim()
}

pub fn struct_size(fields: &[Field], align_to_16: bool) -> usize {
    SizeModel::struct_size(fields, align_to_16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(name: &str, size: usize) -> Field {
        Field::try_new(name, "int", 1, size).unwrap()
    }

    #[test]
    fn test_struct_size_alignment() {
        let fields = vec![sized("a", 4), sized("b", 4)];
        assert_eq!(struct_size(&fields, true), 32);
        assert_eq!(struct_size(&fields, false), 8);
        assert_eq!(struct_size(&[], true), 0);
    }

    #[test]
    fn test_matrix_sizes() {
        assert_eq!(SizeModel::field_size("float4x4", 1), (64, false));
        assert_eq!(SizeModel::field_size("REX::W32::XMFLOAT3X4", 1), (48, false));
        assert_eq!(SizeModel::field_size("DirectX::XMFLOAT4X4", 2), (128, false));
        assert_eq!(SizeModel::field_size("xmfloat2x3", 1), (24, false));
    }

    #[test]
    fn test_namespaced_and_array_types() {
        assert_eq!(SizeModel::normalize_type("REX::W32::Float4"), "float4");
        assert_eq!(SizeModel::field_size("float4[3]", 1), (48, false));
        assert_eq!(SizeModel::field_size("float", 3), (12, false));
        assert_eq!(SizeModel::field_size("Light*", 1), (8, false));
        assert_eq!(SizeModel::field_size("LightData", 1), (4, true));
    }

    #[test]
    fn test_base_type_detection() {
        assert!(SizeModel::is_base_type("float3"));
        assert!(SizeModel::is_base_type("DirectX::XMFLOAT4X4"));
        assert!(!SizeModel::is_base_type("PerFrame"));
    }

    #[test]
    fn test_packed_size() {
        let fields = vec![
            Field::new("a", "float4", 1).with_pack_offset("c0"),
            Field::new("b", "float", 1).with_pack_offset("c2.y"),
            Field::new("c", "float", 1),
        ];
        // b lands at 36, c follows at 40, total 44 rounds to 48
        assert_eq!(SizeModel::packed_size(&fields).unwrap(), 48);

        let untagged = vec![sized("a", 4), sized("b", 4)];
        assert_eq!(SizeModel::packed_size(&untagged).unwrap(), 16);
    }

    #[test]
    fn test_oversized_field() {
        assert_eq!(SizeModel::checked_field_size("float4x4", 1 << 60), None);
        assert_eq!(SizeModel::checked_field_size("float4x4[4]", usize::MAX), None);
        assert_eq!(SizeModel::field_size("float4x4", 1 << 60), (usize::MAX, false));
        assert_eq!(SizeModel::checked_field_size("float", 1 << 60), Some((1 << 62, false)));

        let fields = vec![Field::new("m", "float4x4", 1 << 60), Field::new("t", "float", 1)];
        assert_eq!(struct_size(&fields, false), usize::MAX);
        assert_eq!(struct_size(&fields, true), usize::MAX & !(ALIGN_16 - 1));
        assert!(SizeModel::packed_size(&fields).is_ok());
    }

    #[test]
    fn test_invalid_pack_offset() {
        let fields = vec![Field::new("a", "float", 1).with_pack_offset("t3")];
        assert!(matches!(
            SizeModel::packed_size(&fields),
            Err(StructureError::InvalidPackOffset(_))
        ));
        assert!(matches!(
            SizeModel::pack_offset_bytes("c99999999999999999999"),
            Err(StructureError::InvalidPackOffset(_))
        ));
        assert!(matches!(
            SizeModel::pack_offset_bytes("c1152921504606846976.y"),
            Err(StructureError::InvalidPackOffset(_))
        ));
    }
}
