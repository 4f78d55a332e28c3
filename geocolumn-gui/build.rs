fn main() {
    // Only run on Windows builds
    #[cfg(windows)]
    {
        let mut res = winres::WindowsResource::new();

        // Set application icon when one is shipped
        if std::path::Path::new("assets/geocolumn.ico").exists() {
            res.set_icon("assets/geocolumn.ico");
        }

        // Set application metadata
        res.set("ProductName", "Geocolumn");
        res.set("FileDescription", "Geocolumn - CSV Geocoding / Reverse Geocoding");
        res.set("LegalCopyright", "Copyright (c) 2025 Albert Hui");

        // Compile the resource file
        res.compile().expect("Failed to compile Windows resources");
    }
}
