use std::io::{Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use crate::error::CodecError;

/// 魔数常量 - 用于标识索引文件格式
pub const MAGIC_BYTES: &[u8] = b"BLGIX";

/// 当前写入的索引格式版本
pub const FORMAT_VERSION: [u8; 2] = [1, 0];

/// 读取时支持的最大主版本
pub const MAX_SUPPORTED_VERSION: u8 = 1;

/// 文件头长度：魔数 + 版本号 + 原始数据大小
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(obj, bincode::config::standard())?)
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    let (value, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(value)
}

/// 将对象序列化为压缩的二进制格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, CodecError> {
    let binary = to_binary(obj)?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&(binary.len() as u32).to_le_bytes());

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&binary)?;
    output.extend_from_slice(&encoder.finish()?);

    tracing::debug!(raw = binary.len(), compressed = output.len(), "索引数据压缩完成");
    Ok(output)
}

/// 从压缩的二进制格式反序列化对象，使用默认最大版本
pub fn from_compressed<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    from_compressed_with_max_version(data, MAX_SUPPORTED_VERSION)
}

/// 从压缩的二进制格式反序列化对象，允许指定支持的最大版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, CodecError> {
    validate_compressed_data_with_max_version(data, max_version)?;

    let size_offset = MAGIC_BYTES.len() + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..size_offset + 4]);
    let original_size = u32::from_le_bytes(size_bytes) as usize;

    let mut decoder = GzDecoder::new(&data[HEADER_LEN..]);
    let mut decompressed = Vec::with_capacity(original_size);
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != original_size {
        return Err(CodecError::SizeMismatch {
            expected: original_size,
            actual: decompressed.len(),
        });
    }

    from_binary(&decompressed)
}

/// 验证压缩数据的文件头是否有效，返回其版本号
pub fn validate_compressed_data(data: &[u8]) -> Result<[u8; 2], CodecError> {
    validate_compressed_data_with_max_version(data, MAX_SUPPORTED_VERSION)
}

/// 验证压缩数据的文件头是否有效，允许指定支持的最大版本
pub fn validate_compressed_data_with_max_version(data: &[u8], max_version: u8) -> Result<[u8; 2], CodecError> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::TooShort(data.len()));
    }

    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(CodecError::BadMagic);
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(CodecError::UnsupportedVersion {
            major: version[0],
            minor: version[1],
        });
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_header_is_checked_before_decoding() {
        let data = to_compressed(&vec!["개발".to_string(), "일상".to_string()], FORMAT_VERSION).unwrap();
        assert_eq!(validate_compressed_data(&data).unwrap(), FORMAT_VERSION);

        let decoded: Vec<String> = from_compressed(&data).unwrap();
        assert_eq!(decoded, vec!["개발", "일상"]);
    }

    #[test]
    fn rejects_short_and_foreign_data() {
        assert!(matches!(validate_compressed_data(b"BLG"), Err(CodecError::TooShort(3))));
        assert!(matches!(
            validate_compressed_data(b"NECMP\x01\x00\x00\x00\x00\x00"),
            Err(CodecError::BadMagic)
        ));
    }

    #[test]
    fn rejects_newer_major_version() {
        let data = to_compressed(&1u32, [2, 0]).unwrap();
        assert!(matches!(
            from_compressed::<u32>(&data),
            Err(CodecError::UnsupportedVersion { major: 2, minor: 0 })
        ));
        assert_eq!(from_compressed_with_max_version::<u32>(&data, 2).unwrap(), 1);
    }

    #[test]
    fn detects_tampered_length() {
        let mut data = to_compressed(&"본문".to_string(), FORMAT_VERSION).unwrap();
        let size_offset = MAGIC_BYTES.len() + 2;
        data[size_offset] = data[size_offset].wrapping_add(1);
        assert!(matches!(
            from_compressed::<String>(&data),
            Err(CodecError::SizeMismatch { .. })
        ));
    }
}
