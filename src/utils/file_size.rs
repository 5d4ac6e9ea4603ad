pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Kilobytes with two decimals, switching to megabytes from 1 MiB up.
    pub fn format_size(size: u64) -> String {
        const KIB: f64 = 1024.0;
        let size = size as f64;

        if size >= KIB * KIB {
            format!("{:.2} MB", size / (KIB * KIB))
        } else {
            format!("{:.2} KB", size / KIB)
        }
    }
}
