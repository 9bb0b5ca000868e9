use anyhow::{Context, Result};
use colored::*;
use sawlink_core::{decoder::decode_frame_from_bytes, Frame, FrameError};
use std::io::{self, Read};
use tracing::{info, warn};

pub fn execute(input: &str) -> Result<std::result::Result<Frame, FrameError>> {
    // Read input hex or stdin
    let text = if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        input.to_string()
    };

    let bytes = hex::decode(text.trim()).context("Input is not valid hex")?;
    info!("Decoding {} bytes", bytes.len());

    let result = decode_frame_from_bytes(&bytes);

    println!("\n=== Frame ===");
    match &result {
        Ok(frame) => {
            println!("Kind:     {:?}", frame.kind());
            println!("Sequence: {}", frame.seq());
            println!("Length:   {}", frame.header.length);
            if !frame.payload.is_empty() {
                println!("Payload:  {}", String::from_utf8_lossy(&frame.payload));
            }
            println!("{} Checksum valid", "✓".green());
        }
        Err(err) => {
            warn!("Frame rejected: {}", err);
            println!("{} Frame would be dropped: {}", "✗".red(), err);
        }
    }

    Ok(result)
}
