// Macropad Key Type
// Represents a single key code from Linux input-event-codes.h

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Represents a single keyboard key code.
///
/// This is a newtype wrapper around u16 for type safety. The numeric
/// values match Linux input-event-codes.h definitions. Codes without a
/// known name are still valid keys; they display as "UNKNOWN" rather
/// than failing, since kernels keep extending the code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

fn key_names() -> &'static [&'static str] {
    static KEY_NAMES: OnceLock<Vec<&'static str>> = OnceLock::new();
    KEY_NAMES.get_or_init(|| {
        let mut names = vec!["UNKNOWN"; 0x300];
        names[0] = "KEY_RESERVED";
        names[1] = "KEY_ESC";
        names[2] = "KEY_1";
        names[3] = "KEY_2";
        names[4] = "KEY_3";
        names[5] = "KEY_4";
        names[6] = "KEY_5";
        names[7] = "KEY_6";
        names[8] = "KEY_7";
        names[9] = "KEY_8";
        names[10] = "KEY_9";
        names[11] = "KEY_0";
        names[12] = "KEY_MINUS";
        names[13] = "KEY_EQUAL";
        names[14] = "KEY_BACKSPACE";
        names[15] = "KEY_TAB";
        names[16] = "KEY_Q";
        names[17] = "KEY_W";
        names[18] = "KEY_E";
        names[19] = "KEY_R";
        names[20] = "KEY_T";
        names[21] = "KEY_Y";
        names[22] = "KEY_U";
        names[23] = "KEY_I";
        names[24] = "KEY_O";
        names[25] = "KEY_P";
        names[26] = "KEY_LEFTBRACE";
        names[27] = "KEY_RIGHTBRACE";
        names[28] = "KEY_ENTER";
        names[29] = "KEY_LEFTCTRL";
        names[30] = "KEY_A";
        names[31] = "KEY_S";
        names[32] = "KEY_D";
        names[33] = "KEY_F";
        names[34] = "KEY_G";
        names[35] = "KEY_H";
        names[36] = "KEY_J";
        names[37] = "KEY_K";
        names[38] = "KEY_L";
        names[39] = "KEY_SEMICOLON";
        names[40] = "KEY_APOSTROPHE";
        names[41] = "KEY_GRAVE";
        names[42] = "KEY_LEFTSHIFT";
        names[43] = "KEY_BACKSLASH";
        names[44] = "KEY_Z";
        names[45] = "KEY_X";
        names[46] = "KEY_C";
        names[47] = "KEY_V";
        names[48] = "KEY_B";
        names[49] = "KEY_N";
        names[50] = "KEY_M";
        names[51] = "KEY_COMMA";
        names[52] = "KEY_DOT";
        names[53] = "KEY_SLASH";
        names[54] = "KEY_RIGHTSHIFT";
        names[55] = "KEY_KPASTERISK";
        names[56] = "KEY_LEFTALT";
        names[57] = "KEY_SPACE";
        names[58] = "KEY_CAPSLOCK";
        names[59] = "KEY_F1";
        names[60] = "KEY_F2";
        names[61] = "KEY_F3";
        names[62] = "KEY_F4";
        names[63] = "KEY_F5";
        names[64] = "KEY_F6";
        names[65] = "KEY_F7";
        names[66] = "KEY_F8";
        names[67] = "KEY_F9";
        names[68] = "KEY_F10";
        names[69] = "KEY_NUMLOCK";
        names[70] = "KEY_SCROLLLOCK";
        names[71] = "KEY_KP7";
        names[72] = "KEY_KP8";
        names[73] = "KEY_KP9";
        names[74] = "KEY_KPMINUS";
        names[75] = "KEY_KP4";
        names[76] = "KEY_KP5";
        names[77] = "KEY_KP6";
        names[78] = "KEY_KPPLUS";
        names[79] = "KEY_KP1";
        names[80] = "KEY_KP2";
        names[81] = "KEY_KP3";
        names[82] = "KEY_KP0";
        names[83] = "KEY_KPDOT";
        names[85] = "KEY_ZENKAKUHANKAKU";
        names[86] = "KEY_102ND";
        names[87] = "KEY_F11";
        names[88] = "KEY_F12";
        names[89] = "KEY_RO";
        names[90] = "KEY_KATAKANA";
        names[91] = "KEY_HIRAGANA";
        names[92] = "KEY_HENKAN";
        names[93] = "KEY_KATAKANAHIRAGANA";
        names[94] = "KEY_MUHENKAN";
        names[95] = "KEY_KPJPCOMMA";
        names[96] = "KEY_KPENTER";
        names[97] = "KEY_RIGHTCTRL";
        names[98] = "KEY_KPSLASH";
        names[99] = "KEY_SYSRQ";
        names[100] = "KEY_RIGHTALT";
        names[101] = "KEY_LINEFEED";
        names[102] = "KEY_HOME";
        names[103] = "KEY_UP";
        names[104] = "KEY_PAGEUP";
        names[105] = "KEY_LEFT";
        names[106] = "KEY_RIGHT";
        names[107] = "KEY_END";
        names[108] = "KEY_DOWN";
        names[109] = "KEY_PAGEDOWN";
        names[110] = "KEY_INSERT";
        names[111] = "KEY_DELETE";
        names[112] = "KEY_MACRO";
        names[113] = "KEY_MUTE";
        names[114] = "KEY_VOLUMEDOWN";
        names[115] = "KEY_VOLUMEUP";
        names[116] = "KEY_POWER";
        names[117] = "KEY_KPEQUAL";
        names[118] = "KEY_KPPLUSMINUS";
        names[119] = "KEY_PAUSE";
        names[120] = "KEY_SCALE";
        names[121] = "KEY_KPCOMMA";
        names[122] = "KEY_HANGEUL";
        names[123] = "KEY_HANJA";
        names[124] = "KEY_YEN";
        names[125] = "KEY_LEFTMETA";
        names[126] = "KEY_RIGHTMETA";
        names[127] = "KEY_COMPOSE";
        names[128] = "KEY_STOP";
        names[129] = "KEY_AGAIN";
        names[130] = "KEY_PROPS";
        names[131] = "KEY_UNDO";
        names[132] = "KEY_FRONT";
        names[133] = "KEY_COPY";
        names[134] = "KEY_OPEN";
        names[135] = "KEY_PASTE";
        names[136] = "KEY_FIND";
        names[137] = "KEY_CUT";
        names[138] = "KEY_HELP";
        names[139] = "KEY_MENU";
        names[140] = "KEY_CALC";
        names[141] = "KEY_SETUP";
        names[142] = "KEY_SLEEP";
        names[143] = "KEY_WAKEUP";
        names[144] = "KEY_FILE";
        names[145] = "KEY_SENDFILE";
        names[146] = "KEY_DELETEFILE";
        names[147] = "KEY_XFER";
        names[148] = "KEY_PROG1";
        names[149] = "KEY_PROG2";
        names[150] = "KEY_WWW";
        names[151] = "KEY_MSDOS";
        names[152] = "KEY_COFFEE";
        names[153] = "KEY_DIRECTION";
        names[154] = "KEY_CYCLEWINDOWS";
        names[155] = "KEY_MAIL";
        names[156] = "KEY_BOOKMARKS";
        names[157] = "KEY_COMPUTER";
        names[158] = "KEY_BACK";
        names[159] = "KEY_FORWARD";
        names[160] = "KEY_CLOSECD";
        names[161] = "KEY_EJECTCD";
        names[162] = "KEY_EJECTCLOSECD";
        names[163] = "KEY_NEXTSONG";
        names[164] = "KEY_PLAYPAUSE";
        names[165] = "KEY_PREVIOUSSONG";
        names[166] = "KEY_STOPCD";
        names[167] = "KEY_RECORD";
        names[168] = "KEY_REWIND";
        names[169] = "KEY_PHONE";
        names[170] = "KEY_ISO";
        names[171] = "KEY_CONFIG";
        names[172] = "KEY_HOMEPAGE";
        names[173] = "KEY_REFRESH";
        names[174] = "KEY_EXIT";
        names[175] = "KEY_MOVE";
        names[176] = "KEY_EDIT";
        names[177] = "KEY_SCROLLUP";
        names[178] = "KEY_SCROLLDOWN";
        names[179] = "KEY_KPLEFTPAREN";
        names[180] = "KEY_KPRIGHTPAREN";
        names[181] = "KEY_NEW";
        names[182] = "KEY_REDO";
        names[183] = "KEY_F13";
        names[184] = "KEY_F14";
        names[185] = "KEY_F15";
        names[186] = "KEY_F16";
        names[187] = "KEY_F17";
        names[188] = "KEY_F18";
        names[189] = "KEY_F19";
        names[190] = "KEY_F20";
        names[191] = "KEY_F21";
        names[192] = "KEY_F22";
        names[193] = "KEY_F23";
        names[194] = "KEY_F24";
        names[200] = "KEY_PLAYCD";
        names[201] = "KEY_PAUSECD";
        names[202] = "KEY_PROG3";
        names[203] = "KEY_PROG4";
        names[204] = "KEY_DASHBOARD";
        names[205] = "KEY_SUSPEND";
        names[206] = "KEY_CLOSE";
        names[207] = "KEY_PLAY";
        names[208] = "KEY_FASTFORWARD";
        names[209] = "KEY_BASSBOOST";
        names[210] = "KEY_PRINT";
        names[211] = "KEY_HP";
        names[212] = "KEY_CAMERA";
        names[213] = "KEY_SOUND";
        names[214] = "KEY_QUESTION";
        names[215] = "KEY_EMAIL";
        names[216] = "KEY_CHAT";
        names[217] = "KEY_SEARCH";
        names[218] = "KEY_CONNECT";
        names[219] = "KEY_FINANCE";
        names[220] = "KEY_SPORT";
        names[221] = "KEY_SHOP";
        names[222] = "KEY_ALTERASE";
        names[223] = "KEY_CANCEL";
        names[224] = "KEY_BRIGHTNESSDOWN";
        names[225] = "KEY_BRIGHTNESSUP";
        names[226] = "KEY_MEDIA";
        names[227] = "KEY_SWITCHVIDEOMODE";
        names[228] = "KEY_KBDILLUMTOGGLE";
        names[229] = "KEY_KBDILLUMDOWN";
        names[230] = "KEY_KBDILLUMUP";
        names[231] = "KEY_SEND";
        names[232] = "KEY_REPLY";
        names[233] = "KEY_FORWARDMAIL";
        names[234] = "KEY_SAVE";
        names[235] = "KEY_DOCUMENTS";
        names[236] = "KEY_BATTERY";
        names[237] = "KEY_BLUETOOTH";
        names[238] = "KEY_WLAN";
        names[239] = "KEY_UWB";
        names[240] = "KEY_UNKNOWN";
        names[241] = "KEY_VIDEO_NEXT";
        names[242] = "KEY_VIDEO_PREV";
        names[243] = "KEY_BRIGHTNESS_CYCLE";
        names[244] = "KEY_BRIGHTNESS_ZERO";
        names[245] = "KEY_DISPLAY_OFF";
        names[246] = "KEY_WIMAX";
        names
    })
}

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    key_names().get(code as usize).copied().unwrap_or("UNKNOWN")
}

/// Try to parse a key name to a key code.
///
/// Accepts the canonical `KEY_*` names used by input-event-codes.h and by
/// the action-mapping config, with or without the `KEY_` prefix, case
/// insensitive.
pub fn key_from_name(name: &str) -> Option<Key> {
    let upper = name.to_uppercase();
    let canonical = if upper.starts_with("KEY_") {
        upper
    } else {
        format!("KEY_{}", upper)
    };

    // Historical aliases carried over from input-event-codes.h
    match canonical.as_str() {
        "KEY_HANGUEL" => return Some(Key(122)),
        "KEY_SCREENLOCK" => return Some(Key(152)),
        _ => {}
    }

    key_names()
        .iter()
        .position(|&n| n == canonical)
        .map(|code| Key(code as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("KEY_A"), Some(Key::from(30)));
        assert_eq!(key_from_name("key_a"), Some(Key::from(30)));
        assert_eq!(key_from_name("A"), Some(Key::from(30)));
        assert_eq!(key_from_name("KEY_KP1"), Some(Key::from(79)));
        assert_eq!(key_from_name("KEY_ENTER"), Some(Key::from(28)));
        assert_eq!(key_from_name("KEY_WIMAX"), Some(Key::from(246)));
        assert_eq!(key_from_name("KEY_BOGUS"), None);
    }

    #[test]
    fn test_key_from_name_aliases() {
        assert_eq!(key_from_name("KEY_HANGUEL"), key_from_name("KEY_HANGEUL"));
        assert_eq!(key_from_name("KEY_SCREENLOCK"), key_from_name("KEY_COFFEE"));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from(30).to_string(), "KEY_A");
        assert_eq!(Key::from(79).to_string(), "KEY_KP1");
    }

    #[test]
    fn test_unrecognized_code_has_distinct_name() {
        // Holes in the table and codes past it both decode, not fail
        assert_eq!(key_name(84), "UNKNOWN");
        assert_eq!(key_name(0x2ff), "UNKNOWN");
        assert_eq!(key_name(0xffff), "UNKNOWN");
        assert_eq!(Key::from(0xffff).code(), 0xffff);
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!("KEY_KP2".parse::<Key>(), Ok(Key::from(80)));
        assert!("KEY_NOPE".parse::<Key>().is_err());
    }

    #[test]
    fn test_key_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Key::from(79), "kp1");
        assert_eq!(map.get(&Key::from(79)), Some(&"kp1"));
    }
}
