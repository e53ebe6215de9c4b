use std::io::{self, Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};

/// 魔数常量 - 用于标识快照文件格式
pub const MAGIC_BYTES: &[u8] = b"UNLST"; // UNiversity LiSTing snapshot

/// 头部长度: 魔数 + 版本号(2字节) + 原始大小(4字节)
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 预分配时假定的最大压缩比
const MAX_EXPANSION: usize = 16;

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, io::Error> {
    bincode::serde::encode_to_vec(obj, bincode::config::standard())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("序列化失败: {}", e)))
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, io::Error> {
    bincode::serde::decode_from_slice(data, bincode::config::standard())
        .map_err(|e| invalid(format!("反序列化失败: {}", e)))
        .map(|(value, _)| value)
}

/// 将对象序列化为压缩的快照格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, io::Error> {
    let binary = to_binary(obj)?;
    let data_len = u32::try_from(binary.len())
        .map_err(|_| invalid(format!("快照过大: {} 字节", binary.len())))?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&data_len.to_le_bytes());

    let mut encoder = GzEncoder::new(output, Compression::best());
    encoder.write_all(&binary)?;
    encoder.finish()
}

/// 从压缩的快照反序列化对象，使用默认最大版本1
pub fn from_compressed<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, io::Error> {
    from_compressed_with_max_version(data, 1)
}

/// 从压缩的快照反序列化对象，允许指定支持的最大版本
pub fn from_compressed_with_max_version<T: serde::de::DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, io::Error> {
    read_header(data, max_version)?;

    let size_offset = MAGIC_BYTES.len() + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..HEADER_LEN]);
    let original_size = u32::from_le_bytes(size_bytes) as usize;

    // 头部的大小字段不可信: 预分配有上限，读取最多多读1字节以便发现不一致
    let payload = &data[HEADER_LEN..];
    let capacity = original_size.min(payload.len().saturating_mul(MAX_EXPANSION));
    let mut decoder = GzDecoder::new(payload).take(original_size as u64 + 1);
    let mut decompressed = Vec::with_capacity(capacity);
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != original_size {
        return Err(invalid(format!(
            "解压后数据大小不匹配: 期望 {} 字节, 实际 {} 字节",
            original_size,
            decompressed.len()
        )));
    }

    from_binary(&decompressed)
}

/// 验证快照头部是否有效，返回版本号
pub fn validate_compressed_data(data: &[u8]) -> Result<[u8; 2], io::Error> {
    read_header(data, 1)
}

fn read_header(data: &[u8], max_version: u8) -> Result<[u8; 2], io::Error> {
    if data.len() < HEADER_LEN {
        return Err(invalid(format!("数据太短，无法解析: {} 字节", data.len())));
    }

    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(invalid("无效的文件格式：魔数不匹配".to_string()));
    }

    let version = [data[MAGIC_BYTES.len()], data[MAGIC_BYTES.len() + 1]];
    if version[0] > max_version {
        return Err(invalid(format!("不支持的版本: {}.{}", version[0], version[1])));
    }

    Ok(version)
}
