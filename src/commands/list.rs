//! List commands implementation

use norprobe_core::chip::{ChipId, IdentityTable};

use crate::programmers;

/// List all supported programmers
pub fn list_programmers() {
    print!("{}", programmers::programmer_help());
}

/// List all identifiable chips
pub fn list_chips(table: &IdentityTable, vendor_filter: Option<&str>) {
    if let Some(filter) = vendor_filter {
        if !table.vendors().iter().any(|v| vendor_matches(v.name, filter)) {
            println!("No known vendor matches '{}'", filter);
            return;
        }
    }

    println!("Identifiable flash chips:");
    println!();
    println!(
        "{:<12} {:<12} {:>8} {:>10} {:>6}",
        "Vendor", "Name", "Size", "JEDEC ID", "REMS"
    );
    println!("{}", "-".repeat(52));

    for chip in table.jedec_devices() {
        let vendor = table.vendor_name(chip.manufacturer).unwrap_or("?");

        // Apply vendor filter if specified
        if let Some(filter) = vendor_filter {
            if !vendor_matches(vendor, filter) {
                continue;
            }
        }

        let jedec_str = format!("{:02X} {:04X}", chip.manufacturer, chip.code);
        let rems_str = rems_code(table, chip)
            .map(|code| format!("{:02X}", code))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<12} {:<12} {:>8} {:>10} {:>6}",
            vendor,
            chip.name,
            format_size(chip.total_size),
            jedec_str,
            rems_str
        );
    }
}

/// REMS device byte of the same part, if the table has one
fn rems_code(table: &IdentityTable, chip: &ChipId) -> Option<u16> {
    table
        .rems_devices()
        .iter()
        .find(|r| r.manufacturer == chip.manufacturer && r.name == chip.name)
        .map(|r| r.code)
}

/// Case-insensitive substring match on the vendor name
fn vendor_matches(vendor: &str, filter: &str) -> bool {
    vendor.to_lowercase().contains(&filter.to_lowercase())
}

fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(4 * 1024 * 1024), "4 MiB");
        assert_eq!(format_size(4096), "4 KiB");
        assert_eq!(format_size(512), "512 B");
    }

    #[test]
    fn test_vendor_matches() {
        assert!(vendor_matches("Winbond", "winb"));
        assert!(vendor_matches("Winbond", "WINBOND"));
        assert!(!vendor_matches("Winbond", "macronix"));
    }

    #[test]
    fn test_rems_code() {
        let table = IdentityTable::builtin();
        let w25q32 = table.jedec_model(0x4016).unwrap();
        let w25q16 = table.jedec_model(0x4015).unwrap();
        assert_eq!(rems_code(table, w25q32), Some(0x15));
        assert_eq!(rems_code(table, w25q16), None);
    }
}
