use crate::FrameKindArg;
use anyhow::{Context, Result};
use bytes::Bytes;
use sawlink_core::{encoder::FrameBuilder, FrameKind, Seq};
use tracing::info;

pub fn execute(kind: FrameKindArg, seq: u8, payload: Option<&str>) -> Result<String> {
    let seq = Seq::from_u8(seq).context("Sequence must be 0 or 1")?;

    let builder = match FrameKind::from(kind) {
        FrameKind::Data => FrameBuilder::data(seq),
        FrameKind::Ack => FrameBuilder::ack(seq),
    };
    let builder = match payload {
        Some(text) => builder.payload(Bytes::copy_from_slice(text.as_bytes())),
        None => builder,
    };

    let encoded = builder.build().context("Failed to encode frame")?;
    info!("Encoded {:?} frame, seq={} ({} bytes)", kind, seq, encoded.len());

    let text = hex::encode(&encoded);
    println!("{}", text);

    Ok(text)
}
