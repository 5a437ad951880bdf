use ArrayError::IncompatibleElementType as IET;

use super::{ArrayError, DataType};

/// A trait representing an array element type.
///
/// Elements convert to and from the native-endian bytes of a decoded chunk.
pub trait Element: Sized + Clone {
    /// Validate the data type.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the data type is incompatible with the element type.
    fn validate_data_type(data_type: &DataType) -> Result<(), ArrayError>;

    /// Convert a slice of elements into native-endian bytes.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the data type is incompatible with the element type.
    fn into_bytes(data_type: &DataType, elements: &[Self]) -> Result<Vec<u8>, ArrayError>;

    /// Convert native-endian bytes into a vector of elements.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the data type is incompatible with the element type, `bytes` is not a whole number of elements, or an element is not a valid value.
    fn from_bytes(data_type: &DataType, bytes: Vec<u8>) -> Result<Vec<Self>, ArrayError>;
}

fn validate_bytes_length(data_type: &DataType, bytes: &[u8]) -> Result<(), ArrayError> {
    let size = data_type.size();
    if size == 0 || bytes.len() % size != 0 {
        Err(ArrayError::InvalidBytesInputSize(bytes.len(), size as u64))
    } else {
        Ok(())
    }
}

impl Element for bool {
    fn validate_data_type(data_type: &DataType) -> Result<(), ArrayError> {
        (data_type == &DataType::Bool).then_some(()).ok_or(IET)
    }

    fn into_bytes(data_type: &DataType, elements: &[Self]) -> Result<Vec<u8>, ArrayError> {
        Self::validate_data_type(data_type)?;
        Ok(elements.iter().map(|&element| u8::from(element)).collect())
    }

    fn from_bytes(data_type: &DataType, bytes: Vec<u8>) -> Result<Vec<Self>, ArrayError> {
        Self::validate_data_type(data_type)?;
        if bytes.iter().all(|&byte| byte <= 1) {
            Ok(bytes.into_iter().map(|byte| byte == 1).collect())
        } else {
            Err(ArrayError::InvalidElementValue)
        }
    }
}

macro_rules! impl_element_pod {
    ($raw_type:ty, $pattern:pat $(,)?) => {
        impl Element for $raw_type {
            fn validate_data_type(data_type: &DataType) -> Result<(), ArrayError> {
                if matches!(data_type, $pattern) {
                    Ok(())
                } else {
                    Err(IET)
                }
            }

            fn into_bytes(data_type: &DataType, elements: &[Self]) -> Result<Vec<u8>, ArrayError> {
                Self::validate_data_type(data_type)?;
                Ok(bytemuck::cast_slice(elements).to_vec())
            }

            fn from_bytes(data_type: &DataType, bytes: Vec<u8>) -> Result<Vec<Self>, ArrayError> {
                Self::validate_data_type(data_type)?;
                validate_bytes_length(data_type, &bytes)?;
                Ok(bytemuck::pod_collect_to_vec(&bytes))
            }
        }
    };
}

impl_element_pod!(i8, DataType::Int8);
impl_element_pod!(i16, DataType::Int16);
impl_element_pod!(i32, DataType::Int32);
impl_element_pod!(i64, DataType::Int64);
impl_element_pod!(u8, DataType::UInt8);
impl_element_pod!(u16, DataType::UInt16);
impl_element_pod!(u32, DataType::UInt32);
impl_element_pod!(u64, DataType::UInt64);
impl_element_pod!(f32, DataType::Float32);
impl_element_pod!(f64, DataType::Float64);

impl<const N: usize> Element for [u8; N] {
    fn validate_data_type(data_type: &DataType) -> Result<(), ArrayError> {
        if let DataType::FixedBytes(n) = data_type {
            (*n == N).then_some(()).ok_or(IET)
        } else {
            Err(IET)
        }
    }

    fn into_bytes(data_type: &DataType, elements: &[Self]) -> Result<Vec<u8>, ArrayError> {
        Self::validate_data_type(data_type)?;
        Ok(elements.concat())
    }

    fn from_bytes(data_type: &DataType, bytes: Vec<u8>) -> Result<Vec<Self>, ArrayError> {
        Self::validate_data_type(data_type)?;
        validate_bytes_length(data_type, &bytes)?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }
}

/// Fixed-width text, one native-endian UTF-32 code point per `u32`.
impl<const N: usize> Element for [u32; N] {
    fn validate_data_type(data_type: &DataType) -> Result<(), ArrayError> {
        if let DataType::FixedString(n) = data_type {
            (*n == N).then_some(()).ok_or(IET)
        } else {
            Err(IET)
        }
    }

    fn into_bytes(data_type: &DataType, elements: &[Self]) -> Result<Vec<u8>, ArrayError> {
        Self::validate_data_type(data_type)?;
        Ok(bytemuck::cast_slice(elements).to_vec())
    }

    fn from_bytes(data_type: &DataType, bytes: Vec<u8>) -> Result<Vec<Self>, ArrayError> {
        Self::validate_data_type(data_type)?;
        validate_bytes_length(data_type, &bytes)?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }
}
