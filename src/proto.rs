//! Generated protobuf messages, servers and clients

pub mod user {
    tonic::include_proto!("catalog.user");
}

pub mod author {
    tonic::include_proto!("catalog.author");
}

pub mod category {
    tonic::include_proto!("catalog.category");
}

pub mod book {
    tonic::include_proto!("catalog.book");
}

/// Encoded descriptors of every service, served through reflection
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("catalog_descriptor");
