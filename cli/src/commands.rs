//! Parsing of the lines typed at the prompt.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyze an image file.
    Photo(PathBuf),
    /// Open the camera preview.
    Camera,
    /// Capture the current camera frame.
    Snap,
    /// Close the camera preview.
    Cancel,
    Add(String),
    /// Remove an ingredient by name or 1-based position.
    Remove(String),
    /// Select a meal type by 1-based position.
    Meal(usize),
    Time(usize),
    /// Toggle a dietary restriction by 1-based position.
    Diet(usize),
    Generate,
    /// Toggle the favorite mark on the n-th recipe shown.
    Fav(usize),
    Favorites,
    Back,
    Reset,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Escribe un comando (help para ver la lista).")]
    Empty,

    #[error("Comando desconocido: {0}")]
    Unknown(String),

    #[error("Falta el argumento de '{0}'.")]
    MissingArgument(&'static str),

    #[error("'{0}' no es un número válido.")]
    InvalidNumber(String),
}

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "" => return Err(ParseError::Empty),
        "photo" | "foto" => Command::Photo(PathBuf::from(argument("photo", rest)?)),
        "camera" | "camara" | "cámara" => Command::Camera,
        "snap" | "capturar" => Command::Snap,
        "cancel" | "cancelar" => Command::Cancel,
        "add" | "añadir" => Command::Add(argument("add", rest)?.to_string()),
        "remove" | "quitar" => Command::Remove(argument("remove", rest)?.to_string()),
        "meal" => Command::Meal(number("meal", rest)?),
        "time" => Command::Time(number("time", rest)?),
        "diet" => Command::Diet(number("diet", rest)?),
        "generate" | "generar" => Command::Generate,
        "fav" => Command::Fav(number("fav", rest)?),
        "favorites" | "favoritos" => Command::Favorites,
        "back" | "volver" => Command::Back,
        "reset" | "inicio" => Command::Reset,
        "help" | "ayuda" | "?" => Command::Help,
        "quit" | "exit" | "salir" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn argument<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn number(command: &'static str, rest: &str) -> Result<usize, ParseError> {
    let arg = argument(command, rest)?;
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::InvalidNumber(arg.to_string())),
    }
}

/// Pick the n-th (1-based) item of a list.
pub fn nth<T>(items: &[T], n: usize) -> Option<&T> {
    n.checked_sub(1).and_then(|i| items.get(i))
}

pub const HELP: &str = "\
Comandos:
  photo <ruta>     Analizar una foto de tus ingredientes
  camera           Abrir la cámara
  snap             Capturar la imagen de la cámara
  cancel           Cerrar la cámara
  add <nombre>     Añadir un ingrediente
  remove <nombre>  Quitar un ingrediente (por nombre o número)
  meal <n>         Elegir tipo de comida
  time <n>         Elegir tiempo de cocción
  diet <n>         Activar o desactivar una restricción
  generate         Generar recetas
  fav <n>          Marcar o desmarcar una receta como favorita
  favorites        Ver tus favoritos
  back             Volver a los ingredientes
  reset            Empezar de nuevo
  help             Mostrar esta ayuda
  quit             Salir";
