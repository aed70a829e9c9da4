//! Project files list the textures that share one palette.
//!
//! ```text
//! #colors 64
//! #offset 16
//! #levels 4
//! wall   textures/wall.png
//! fence  "textures/old fence.png" 0 0
//! ```
//!
//! Directive lines start with `#`. Any other non-empty line is a texture:
//! a name, a path relative to the project file, and optionally the `x y`
//! coordinates of a pixel whose color becomes the transparent index.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{Error, Result};
use crate::quantize::MAX_COLORS;
use crate::texture::NAME_LEN;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureEntry {
    pub name: String,
    pub path: PathBuf,
    pub transparent_at: Option<(u32, u32)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub colors: usize,
    pub offset: u8,
    pub levels: usize,
    pub textures: Vec<TextureEntry>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            colors: 16,
            offset: 0,
            levels: 1,
            textures: Vec::new(),
        }
    }
}

impl Project {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let folder = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let folder = if folder.as_os_str().is_empty() {
            std::env::current_dir()?
        } else {
            folder
        };
        Self::parse(&text, &folder)
    }

    /// Parse project text; relative texture paths are joined onto `folder`.
    pub fn parse(text: &str, folder: &Path) -> Result<Self> {
        let mut project = Project::default();
        let mut names = HashSet::new();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let err = |message: String| Error::Project { line, message };

            let (command, body) = match raw.strip_prefix('#') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let fields =
                shlex::split(body).ok_or_else(|| err("unbalanced quoting".to_string()))?;
            if fields.is_empty() {
                continue;
            }

            if command {
                match fields[0].as_str() {
                    "colors" => {
                        project.colors = directive_arg(&fields, 1, MAX_COLORS).map_err(err)?;
                    }
                    "offset" => {
                        project.offset = directive_arg(&fields, 0, 255).map_err(err)? as u8;
                    }
                    "levels" => {
                        project.levels = directive_arg(&fields, 1, usize::MAX).map_err(err)?;
                    }
                    // unknown directives are comments
                    _ => {}
                }
                continue;
            }

            if fields.len() != 2 && fields.len() != 4 {
                return Err(err(format!(
                    "expected `name path [x y]`, got {} fields",
                    fields.len()
                )));
            }

            let mut name = fields[0].clone();
            if name.len() > NAME_LEN {
                let mut end = NAME_LEN;
                while !name.is_char_boundary(end) {
                    end -= 1;
                }
                let cropped = name[..end].to_string();
                warn!("Name \"{name}\" will be cropped to \"{cropped}\"");
                name = cropped;
            }
            if !names.insert(name.clone()) {
                return Err(err(format!("name \"{name}\" is not unique")));
            }

            let path = PathBuf::from(&fields[1]);
            let path = if path.is_absolute() {
                path
            } else {
                folder.join(path)
            };

            let transparent_at = if fields.len() == 4 {
                let x = fields[2]
                    .parse()
                    .map_err(|_| err(format!("wrong X coordinate `{}`", fields[2])))?;
                let y = fields[3]
                    .parse()
                    .map_err(|_| err(format!("wrong Y coordinate `{}`", fields[3])))?;
                Some((x, y))
            } else {
                None
            };

            project.textures.push(TextureEntry {
                name,
                path,
                transparent_at,
            });
        }

        // The palette stores `colors` entries plus the reserved one, and every
        // stored index is shifted by `offset` into a single byte.
        if project.colors + 1 + project.offset as usize > MAX_COLORS {
            return Err(Error::Project {
                line: 0,
                message: format!(
                    "wrong number of colors ({}+1+{}>{MAX_COLORS})",
                    project.colors, project.offset
                ),
            });
        }
        Ok(project)
    }
}

fn directive_arg(fields: &[String], min: usize, max: usize) -> Result<usize, String> {
    let name = &fields[0];
    let value = fields
        .get(1)
        .ok_or_else(|| format!("not enough arguments for command '{name}'"))?;
    value
        .parse::<usize>()
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| format!("wrong argument for command '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn honours_shell_quoting() {
        let text = r#"a "b c" 0 0
'd e' f\ g.png
"x\"y" z.png"#;
        let project = Project::parse(text, Path::new("/")).unwrap();
        let names: Vec<&str> = project.textures.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "d e", "x\"y"]);
        assert_eq!(project.textures[0].path, PathBuf::from("/b c"));
        assert_eq!(project.textures[1].path, PathBuf::from("/f g.png"));

        let err = Project::parse("wall 'open.png", Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::Project { line: 1, .. }));
    }

    #[test]
    fn trailing_comment_is_ignored() {
        let project = Project::parse("wall a.png # brick wall\n", Path::new("/")).unwrap();
        assert_eq!(project.textures.len(), 1);
        assert_eq!(project.textures[0].name, "wall");
        assert_eq!(project.textures[0].path, PathBuf::from("/a.png"));
        assert_eq!(project.textures[0].transparent_at, None);
    }

    #[test]
    fn parses_project() {
        let text = "#colors 64\n#offset 16\n#levels 3\n\n\
                    wall tex/wall.png\n\
                    fence \"/abs/old fence.png\" 3 4\n";
        let project = Project::parse(text, Path::new("/proj")).unwrap();

        assert_eq!(project.colors, 64);
        assert_eq!(project.offset, 16);
        assert_eq!(project.levels, 3);
        assert_eq!(
            project.textures,
            vec![
                TextureEntry {
                    name: "wall".to_string(),
                    path: PathBuf::from("/proj/tex/wall.png"),
                    transparent_at: None,
                },
                TextureEntry {
                    name: "fence".to_string(),
                    path: PathBuf::from("/abs/old fence.png"),
                    transparent_at: Some((3, 4)),
                },
            ]
        );
    }

    #[test]
    fn crops_long_names() {
        let project = Project::parse("abcdefghijklmnopqrstuvwxyz a.png", Path::new("/")).unwrap();
        assert_eq!(project.textures[0].name, "abcdefghijklmnop");
    }

    #[test]
    fn rejects_bad_lines() {
        let cases = [
            "#colors",
            "#colors 0",
            "#colors 257",
            "#offset 256",
            "#levels 0",
            "one",
            "a b c",
            "a a.png x 0",
            "a a.png\na b.png",
            "#colors 200\n#offset 100",
            "#colors 255",
            "#colors 256",
            "#colors 200\n#offset 56",
        ];
        for case in cases {
            assert!(
                matches!(Project::parse(case, Path::new("/")), Err(Error::Project { .. })),
                "{case:?} was accepted"
            );
        }
    }

    #[test]
    fn largest_palette_that_fits_a_byte() {
        let project = Project::parse("#colors 254", Path::new("/")).unwrap();
        assert_eq!(project.colors, 254);
        let project = Project::parse("#colors 200\n#offset 55", Path::new("/")).unwrap();
        assert_eq!((project.colors, project.offset), (200, 55));
    }

    #[test]
    fn reports_line_numbers() {
        let err = Project::parse("#colors 8\n\nbroken\n", Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::Project { line: 3, .. }));
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let project = Project::parse("# a comment\n#colors 4", Path::new("/")).unwrap();
        assert_eq!(project.colors, 4);
        assert!(project.textures.is_empty());
    }
}
