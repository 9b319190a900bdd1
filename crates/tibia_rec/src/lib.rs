//! This library handles reading legacy *Tibia* session recordings and writing them as **TRP** files.
//!
//! # Recording Formats
//!
//! Over the years a number of third-party tools have been used to capture play sessions of the game.
//! Each of them stores the captured server packets in its own binary layout. This crate reads all
//! of them into one [`Recording`] model and writes that model back out in the canonical **TRP**
//! format.
//!
//! | Extension | Origin          | Read | Write | Notes                                              |
//! |-----------|-----------------|------|-------|----------------------------------------------------|
//! | `.trp`    | Tibia Replay    | yes  | yes   | Canonical archival format                          |
//! | `.rec`    | TibiCAM         | yes  | no    | Encrypted from container version 515 onwards       |
//! | `.cam`    | TibiaCAM        | yes  | no    | LZMA compressed                                    |
//! | `.ttm`    | TibiaTimeMachine| yes  | no    | Relative timestamps                                |
//! | `.tmv`    | TibiaMovie      | yes  | no    | Gzip compressed, `TMV2` files are not supported    |
//!
//! ## TRP File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "TRP\0"                                           |
//! | 0x0004         | Version                | 2 bytes: Client version, e.g. 772 for 7.72                 |
//! | 0x0006         | Length                 | 4 bytes: Length of the recording in milliseconds           |
//! | 0x000A         | Frame Count            | 4 bytes: Number of frames that follow                      |
//!
//! Each frame is stored as:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Time                   | 4 bytes: Milliseconds since the start of the recording  |
//! | 0x0004         | Data Length            | 2 bytes: Number of bytes in the packet                  |
//! | 0x0006         | Data                   | (Data Length) bytes: One server packet                  |
//!
//! ## Frame Reconstruction
//!
//! The capture tools behind `.rec`, `.cam` and `.tmv` store raw network reads. A read may hold a
//! fraction of a packet or several packets at once. Every packet is however preceded by its own
//! two byte length, which [`reassemble`] uses to split the concatenated stream back into exactly
//! one packet per [`Frame`].
//!
//! ## Inference
//!
//! Only some formats declare the client version. The [`guess`] module recovers it from the login
//! notice sent by the server, and can also guess the game world the session was recorded on.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod crypto;
pub mod error;
pub mod formats;
pub mod guess;
pub mod hexdump;
pub mod reassemble;
pub mod recording;
pub mod registry;
pub mod stream;

pub use formats::{RecordingFormat, Source};
pub use reassemble::reassemble;
pub use recording::{Decoded, Frame, Recording};
pub use registry::{load, save, LoadOptions, Registry};
