use crate::description::AlignmentDescription;

pub fn read_alignment_json(path: &str) -> std::io::Result<AlignmentDescription> {
    let contents = crate::io::read_to_string(path)?;
    let description: AlignmentDescription = serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(description)
}

pub fn write_alignment_json(path: &str, description: &AlignmentDescription) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(description).map_err(std::io::Error::other)?;
    crate::io::write_string(path, &json)
}
