// Derived metrics
//
// These need values from several chunks, so they run once a traversal has
// seen everything.

pub const BITS_IN_BYTE: u64 = 8;
pub const KILOBYTE: u64 = 1000;

/// Bit rate in kbps from the audio payload length and the precise duration.
/// `None` when either input is missing or the duration is not positive.
pub fn iff_bit_rate(audio_data_length: Option<u64>, precise_length: Option<f64>) -> Option<u32> {
    let length = audio_data_length?;
    let secs = precise_length?;
    if secs <= 0.0 || !secs.is_finite() {
        return None;
    }
    let kbps = (length as f64 * BITS_IN_BYTE as f64 / (secs * KILOBYTE as f64)).round();
    Some(kbps as u32)
}

/// Bit rate fields of a Vorbis identification header, in bits per second
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VorbisBitrates {
    pub maximum: i32,
    pub nominal: i32,
    pub minimum: i32,
}

/// Ogg Vorbis bit rate in kbps plus the variable-bit-rate flag
pub fn ogg_bit_rate(bitrates: VorbisBitrates, file_size: u64, precise_length: f64) -> (u32, bool) {
    let VorbisBitrates {
        maximum,
        nominal,
        minimum,
    } = bitrates;

    if nominal != 0 && maximum == nominal && minimum == nominal {
        return ((nominal / 1000) as u32, false);
    }
    if nominal != 0 && maximum == 0 && minimum == 0 {
        return ((nominal / 1000) as u32, true);
    }
    (estimated_bit_rate(file_size, precise_length), true)
}

/// Whole-file estimate: kilobytes * 8 / seconds, treating a duration that
/// rounds to zero as one second
pub fn estimated_bit_rate(file_size: u64, precise_length: f64) -> u32 {
    let mut secs = precise_length.round().max(0.0) as u64;
    if secs == 0 {
        secs = 1;
    }
    ((file_size / KILOBYTE) * BITS_IN_BYTE / secs) as u32
}

/// Duration in seconds of a stream whose final page sits at `granule`
pub fn granule_duration(granule: u64, sample_rate: u32) -> Option<f64> {
    if sample_rate == 0 {
        return None;
    }
    Some(granule as f64 / sample_rate as f64)
}

/// ASF play duration (100 ns units) minus preroll (ms), in seconds
pub fn asf_duration(play_duration: u64, preroll_ms: u64) -> f64 {
    let secs = play_duration as f64 / 10_000_000.0 - preroll_ms as f64 / 1000.0;
    secs.max(0.0)
}

/// ASF bit rate in kbps: the audio stream's average byte rate when known,
/// otherwise the file's declared maximum bit rate
pub fn asf_bit_rate(average_bytes_per_second: Option<u32>, max_bitrate: Option<u32>) -> Option<u32> {
    match average_bytes_per_second {
        Some(bytes) if bytes > 0 => {
            let kbps = (bytes as f64 * BITS_IN_BYTE as f64 / KILOBYTE as f64).round();
            Some(kbps as u32)
        }
        _ => max_bitrate.filter(|&bits| bits > 0).map(|bits| bits / KILOBYTE as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cd_quality_one_second() {
        assert_eq!(iff_bit_rate(Some(176_400), Some(1.0)), Some(1411));
    }

    #[test]
    fn iff_bit_rate_needs_both_inputs() {
        assert_eq!(iff_bit_rate(None, Some(1.0)), None);
        assert_eq!(iff_bit_rate(Some(10), None), None);
        assert_eq!(iff_bit_rate(Some(10), Some(0.0)), None);
    }

    #[test]
    fn ogg_constant_rate() {
        let rates = VorbisBitrates {
            maximum: 128_000,
            nominal: 128_000,
            minimum: 128_000,
        };
        assert_eq!(ogg_bit_rate(rates, 1, 1.0), (128, false));
    }

    #[test]
    fn ogg_average_rate() {
        let rates = VorbisBitrates {
            maximum: 0,
            nominal: 160_000,
            minimum: 0,
        };
        assert_eq!(ogg_bit_rate(rates, 1, 1.0), (160, true));
    }

    #[test]
    fn ogg_fallback_estimate() {
        let rates = VorbisBitrates {
            maximum: 256_000,
            nominal: 128_000,
            minimum: 0,
        };
        // 1_000_000 bytes over 10 s -> 1000 KB * 8 / 10
        assert_eq!(ogg_bit_rate(rates, 1_000_000, 10.2), (800, true));
        // sub-half-second tracks count as one second
        assert_eq!(estimated_bit_rate(50_000, 0.3), 400);
    }

    #[test]
    fn granule_over_rate() {
        assert_eq!(granule_duration(441_000, 44_100), Some(10.0));
        assert_eq!(granule_duration(1, 0), None);
    }

    #[test]
    fn asf_preroll_subtracted() {
        assert_eq!(asf_duration(50_000_000, 3_000), 2.0);
        assert_eq!(asf_duration(0, 3_000), 0.0);
    }

    #[test]
    fn asf_rate_prefers_stream_average() {
        assert_eq!(asf_bit_rate(Some(16_000), Some(320_000)), Some(128));
        assert_eq!(asf_bit_rate(None, Some(320_000)), Some(320));
        assert_eq!(asf_bit_rate(Some(0), None), None);
    }
}
