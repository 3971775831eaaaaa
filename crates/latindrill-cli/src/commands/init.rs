//! The `latindrill init` command.

use std::path::Path;

use anyhow::Result;

use latindrill_store::config::SAMPLE_CONFIG;

pub fn execute() -> Result<()> {
    write_once(Path::new("latindrill.toml"), SAMPLE_CONFIG)?;
    write_once(Path::new("lexicon-example.toml"), EXAMPLE_LEXICON)?;

    println!("\nNext steps:");
    println!("  1. Edit latindrill.toml (uncomment `lexicon` to use your own words)");
    println!("  2. Run: latindrill lexicon --check --file lexicon-example.toml");
    println!("  3. Run: latindrill play --mode construct");

    Ok(())
}

fn write_once(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const EXAMPLE_LEXICON: &str = r#"# A small latindrill lexicon.
# Nouns need nominative and accusative singular; verbs need the 3rd person.

[[nouns]]
lemma = "dea"
declension = 1
gender = "f"
gloss = "goddess"
nom = "dea"
acc = "deam"

[[nouns]]
lemma = "lupus"
declension = 2
gender = "m"
gloss = "wolf"
nom = "lupus"
acc = "lupum"

[[nouns]]
lemma = "templum"
declension = 2
gender = "n"
gloss = "temple"
nom = "templum"
acc = "templum"

[[nouns]]
lemma = "dux"
declension = 3
gender = "m"
gloss = "leader"
nom = "dux"
acc = "ducem"

[[verbs]]
id = "spectare"
first_person = "specto"
third_person = "spectat"
gloss = "watches"
conjugation = "1st"

[[verbs]]
id = "timere"
first_person = "timeo"
third_person = "timet"
gloss = "fears"
conjugation = "2nd"

[[adjectives]]
lemma = "altus"
gloss = "tall"

[adjectives.nom]
m = "altus"
f = "alta"
n = "altum"

[adjectives.acc]
m = "altum"
f = "altam"
n = "altum"
"#;
