pub mod capture;
pub mod format;
pub mod pcm_sink;
pub mod playback;
pub mod settings;
pub mod sink;
pub mod wav_sink;

pub use capture::{CpalInput, InputDevice, Tap};
pub use format::{AudioFormat, FileFormat};
pub use playback::{OutputDevice, RodioOutput};
pub use settings::{AudioSettings, ChannelLayout, Preset};
pub use sink::{Buffer, FrameWriter, OpenPolicy, SinkTap, StreamingSink};
