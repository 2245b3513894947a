//! Block opcode table.
//!
//! One row per block: its Scratch 2 selector, its Scratch 3 opcode, the
//! Snap! selector it becomes, and its arguments in Snap! slot order.
//! Scratch 2 arguments are positional and already in that order; Scratch 3
//! arguments are found by input/field name.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// How a source argument becomes a Snap! slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Ordinary input slot: literal or nested reporter.
    Slot,
    /// Dropdown that also accepts names; special values become options.
    Menu,
    /// Fixed dropdown: always rendered as an option.
    Option,
    /// Variable name given as text (`set [var] to`).
    VarName,
    /// List given by name; rendered as a variable reporter.
    ListRef,
    /// C-slot holding a nested script.
    Script,
    /// Slot Snap! needs that the source block does not have.
    Const(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    /// Scratch 3 input or field name.
    pub name: &'static str,
    pub kind: ArgKind,
}

#[derive(Debug)]
pub struct BlockSpec {
    pub sb2: &'static str,
    pub sb3: &'static str,
    pub snap: &'static str,
    pub args: &'static [ArgSpec],
}

impl BlockSpec {
    /// Arguments that consume a source value.
    pub fn source_args(&self) -> impl Iterator<Item = &ArgSpec> {
        self.args
            .iter()
            .filter(|arg| !matches!(arg.kind, ArgKind::Const(_)))
    }
}

const fn slot(name: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::Slot,
    }
}

const fn menu(name: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::Menu,
    }
}

const fn option(name: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::Option,
    }
}

const fn var_name(name: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::VarName,
    }
}

const fn list_ref(name: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::ListRef,
    }
}

const fn script(name: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::Script,
    }
}

const fn constant(value: &'static str) -> ArgSpec {
    ArgSpec {
        name: "",
        kind: ArgKind::Const(value),
    }
}

macro_rules! block {
    ($sb2:literal, $sb3:literal => $snap:literal $(, $arg:expr)* $(,)?) => {
        BlockSpec {
            sb2: $sb2,
            sb3: $sb3,
            snap: $snap,
            args: &[$($arg),*],
        }
    };
}

/// Scratch 2 variable reporter selectors.
pub const SB2_READ_VARIABLE: &str = "readVariable";
pub const SB2_LIST_CONTENTS: &str = "contentsOfList:";
/// Scratch 3 variable reporter opcodes.
pub const SB3_VARIABLE: &str = "data_variable";
pub const SB3_LIST_CONTENTS: &str = "data_listcontents";

pub static BLOCKS: &[BlockSpec] = &[
    // Motion
    block!("forward:", "motion_movesteps" => "forward", slot("STEPS")),
    block!("turnRight:", "motion_turnright" => "turn", slot("DEGREES")),
    block!("turnLeft:", "motion_turnleft" => "turnLeft", slot("DEGREES")),
    block!("heading:", "motion_pointindirection" => "setHeading", slot("DIRECTION")),
    block!("pointTowards:", "motion_pointtowards" => "doFaceTowards", menu("TOWARDS")),
    block!("gotoX:y:", "motion_gotoxy" => "gotoXY", slot("X"), slot("Y")),
    block!("gotoSpriteOrMouse:", "motion_goto" => "doGotoObject", menu("TO")),
    block!("glideSecs:toX:y:elapsed:from:", "motion_glidesecstoxy" => "doGlide",
        slot("SECS"), slot("X"), slot("Y")),
    block!("changeXposBy:", "motion_changexby" => "changeXPosition", slot("DX")),
    block!("xpos:", "motion_setx" => "setXPosition", slot("X")),
    block!("changeYposBy:", "motion_changeyby" => "changeYPosition", slot("DY")),
    block!("ypos:", "motion_sety" => "setYPosition", slot("Y")),
    block!("bounceOffEdge", "motion_ifonedgebounce" => "bounceOffEdge"),
    block!("xpos", "motion_xposition" => "xPosition"),
    block!("ypos", "motion_yposition" => "yPosition"),
    block!("heading", "motion_direction" => "direction"),
    // Looks
    block!("say:duration:elapsed:from:", "looks_sayforsecs" => "doSayFor",
        slot("MESSAGE"), slot("SECS")),
    block!("say:", "looks_say" => "bubble", slot("MESSAGE")),
    block!("think:duration:elapsed:from:", "looks_thinkforsecs" => "doThinkFor",
        slot("MESSAGE"), slot("SECS")),
    block!("think:", "looks_think" => "doThink", slot("MESSAGE")),
    block!("show", "looks_show" => "show"),
    block!("hide", "looks_hide" => "hide"),
    block!("lookLike:", "looks_switchcostumeto" => "doSwitchToCostume", menu("COSTUME")),
    block!("nextCostume", "looks_nextcostume" => "doWearNextCostume"),
    block!("changeSizeBy:", "looks_changesizeby" => "changeScale", slot("CHANGE")),
    block!("setSizeTo:", "looks_setsizeto" => "setScale", slot("SIZE")),
    block!("scale", "looks_size" => "getScale"),
    block!("comeToFront", "looks_gotofrontback" => "comeToFront"),
    // Sound
    block!("playSound:", "sound_play" => "playSound", menu("SOUND_MENU")),
    block!("doPlaySoundAndWait", "sound_playuntildone" => "doPlaySoundUntilDone",
        menu("SOUND_MENU")),
    block!("stopAllSounds", "sound_stopallsounds" => "doStopAllSounds"),
    // Pen
    block!("clearPenTrails", "pen_clear" => "clear"),
    block!("putPenDown", "pen_penDown" => "down"),
    block!("putPenUp", "pen_penUp" => "up"),
    block!("penSize:", "pen_setPenSizeTo" => "setSize", slot("SIZE")),
    block!("changePenSizeBy:", "pen_changePenSizeBy" => "changeSize", slot("SIZE")),
    block!("stampCostume", "pen_stamp" => "doStamp"),
    // Events
    block!("whenGreenFlag", "event_whenflagclicked" => "receiveGo"),
    block!("whenKeyPressed", "event_whenkeypressed" => "receiveKey", option("KEY_OPTION")),
    block!("whenClicked", "event_whenthisspriteclicked" => "receiveInteraction",
        constant("clicked")),
    block!("whenIReceive", "event_whenbroadcastreceived" => "receiveMessage",
        slot("BROADCAST_OPTION")),
    block!("broadcast:", "event_broadcast" => "doBroadcast", slot("BROADCAST_INPUT")),
    block!("doBroadcastAndWait", "event_broadcastandwait" => "doBroadcastAndWait",
        slot("BROADCAST_INPUT")),
    // Control
    block!("wait:elapsed:from:", "control_wait" => "doWait", slot("DURATION")),
    block!("doForever", "control_forever" => "doForever", script("SUBSTACK")),
    block!("doRepeat", "control_repeat" => "doRepeat", slot("TIMES"), script("SUBSTACK")),
    block!("doIf", "control_if" => "doIf", slot("CONDITION"), script("SUBSTACK")),
    block!("doIfElse", "control_if_else" => "doIfElse",
        slot("CONDITION"), script("SUBSTACK"), script("SUBSTACK2")),
    block!("doWaitUntil", "control_wait_until" => "doWaitUntil", slot("CONDITION")),
    block!("doUntil", "control_repeat_until" => "doUntil",
        slot("CONDITION"), script("SUBSTACK")),
    block!("stopScripts", "control_stop" => "doStopThis", option("STOP_OPTION")),
    block!("createCloneOf", "control_create_clone_of" => "createClone", menu("CLONE_OPTION")),
    block!("whenCloned", "control_start_as_clone" => "receiveOnClone"),
    block!("deleteClone", "control_delete_this_clone" => "removeClone"),
    // Sensing
    block!("touching:", "sensing_touchingobject" => "reportTouchingObject",
        menu("TOUCHINGOBJECTMENU")),
    block!("doAsk", "sensing_askandwait" => "doAsk", slot("QUESTION")),
    block!("answer", "sensing_answer" => "getLastAnswer"),
    block!("keyPressed:", "sensing_keypressed" => "reportKeyPressed", option("KEY_OPTION")),
    block!("mousePressed", "sensing_mousedown" => "reportMouseDown"),
    block!("mouseX", "sensing_mousex" => "reportMouseX"),
    block!("mouseY", "sensing_mousey" => "reportMouseY"),
    block!("timer", "sensing_timer" => "getTimer"),
    block!("timerReset", "sensing_resettimer" => "doResetTimer"),
    // Operators
    block!("+", "operator_add" => "reportSum", slot("NUM1"), slot("NUM2")),
    block!("-", "operator_subtract" => "reportDifference", slot("NUM1"), slot("NUM2")),
    block!("*", "operator_multiply" => "reportProduct", slot("NUM1"), slot("NUM2")),
    block!("/", "operator_divide" => "reportQuotient", slot("NUM1"), slot("NUM2")),
    block!("%", "operator_mod" => "reportModulus", slot("NUM1"), slot("NUM2")),
    block!("randomFrom:to:", "operator_random" => "reportRandom", slot("FROM"), slot("TO")),
    block!("<", "operator_lt" => "reportLessThan", slot("OPERAND1"), slot("OPERAND2")),
    block!("=", "operator_equals" => "reportEquals", slot("OPERAND1"), slot("OPERAND2")),
    block!(">", "operator_gt" => "reportGreaterThan", slot("OPERAND1"), slot("OPERAND2")),
    block!("&", "operator_and" => "reportAnd", slot("OPERAND1"), slot("OPERAND2")),
    block!("|", "operator_or" => "reportOr", slot("OPERAND1"), slot("OPERAND2")),
    block!("not", "operator_not" => "reportNot", slot("OPERAND")),
    block!("concatenate:with:", "operator_join" => "reportJoinWords",
        slot("STRING1"), slot("STRING2")),
    block!("letter:of:", "operator_letter_of" => "reportLetter", slot("LETTER"), slot("STRING")),
    block!("stringLength:", "operator_length" => "reportStringSize", slot("STRING")),
    block!("rounded", "operator_round" => "reportRound", slot("NUM")),
    block!("computeFunction:of:", "operator_mathop" => "reportMonadic",
        option("OPERATOR"), slot("NUM")),
    // Data
    block!("setVar:to:", "data_setvariableto" => "doSetVar", var_name("VARIABLE"), slot("VALUE")),
    block!("changeVar:by:", "data_changevariableby" => "doChangeVar",
        var_name("VARIABLE"), slot("VALUE")),
    block!("showVariable:", "data_showvariable" => "doShowVar", var_name("VARIABLE")),
    block!("hideVariable:", "data_hidevariable" => "doHideVar", var_name("VARIABLE")),
    block!("append:toList:", "data_addtolist" => "doAddToList", slot("ITEM"), list_ref("LIST")),
    block!("deleteLine:ofList:", "data_deleteoflist" => "doDeleteFromList",
        slot("INDEX"), list_ref("LIST")),
    block!("insert:at:ofList:", "data_insertatlist" => "doInsertInList",
        slot("ITEM"), slot("INDEX"), list_ref("LIST")),
    block!("setLine:ofList:to:", "data_replaceitemoflist" => "doReplaceInList",
        slot("INDEX"), list_ref("LIST"), slot("ITEM")),
    block!("getLine:ofList:", "data_itemoflist" => "reportListItem",
        slot("INDEX"), list_ref("LIST")),
    block!("lineCountOfList:", "data_lengthoflist" => "reportListLength", list_ref("LIST")),
    block!("list:contains:", "data_listcontainsitem" => "reportListContainsItem",
        list_ref("LIST"), slot("ITEM")),
];

static SB2_INDEX: LazyLock<FxHashMap<&'static str, &'static BlockSpec>> =
    LazyLock::new(|| BLOCKS.iter().map(|spec| (spec.sb2, spec)).collect());

static SB3_INDEX: LazyLock<FxHashMap<&'static str, &'static BlockSpec>> =
    LazyLock::new(|| BLOCKS.iter().map(|spec| (spec.sb3, spec)).collect());

/// Look up a Scratch 2 selector.
pub fn lookup_sb2(selector: &str) -> Option<&'static BlockSpec> {
    SB2_INDEX.get(selector).copied()
}

/// Scratch 2 selectors with no Snap! row that still name real blocks.
const SB2_UNMAPPED_SELECTORS: &[&str] = &["call", "getParam", "procDef"];

/// Whether `selector` names a Scratch 2 block, mapped or not.
pub fn is_sb2_block(selector: &str) -> bool {
    selector == SB2_READ_VARIABLE
        || selector == SB2_LIST_CONTENTS
        || SB2_UNMAPPED_SELECTORS.contains(&selector)
        || lookup_sb2(selector).is_some()
}

/// Look up a Scratch 3 opcode.
pub fn lookup_sb3(opcode: &str) -> Option<&'static BlockSpec> {
    SB3_INDEX.get(opcode).copied()
}

/// Scratch 3 opcodes whose row only holds for one field value, as
/// `(opcode, field, value)`. Other values are treated as unmapped.
const SB3_FIELD_GUARDS: &[(&str, &str, &str)] =
    &[("looks_gotofrontback", "FRONT_BACK", "front")];

/// Look up a Scratch 3 opcode, checking field guards with `field`, which
/// returns the text of a named field.
pub fn lookup_sb3_guarded(
    opcode: &str,
    field: impl Fn(&str) -> Option<String>,
) -> Option<&'static BlockSpec> {
    let spec = lookup_sb3(opcode)?;
    let allowed = SB3_FIELD_GUARDS
        .iter()
        .filter(|(guarded, _, _)| *guarded == opcode)
        .all(|(_, name, value)| field(*name).as_deref() == Some(*value));
    allowed.then_some(spec)
}

/// Snap! option for a Scratch menu special value, if it has one.
pub fn menu_option(value: &str) -> Option<&'static str> {
    match value {
        "_mouse_" => Some("mouse-pointer"),
        "_random_" => Some("random position"),
        "_edge_" => Some("edge"),
        "_myself_" => Some("myself"),
        "_stage_" => Some("Stage"),
        _ => None,
    }
}

/// Snap! spelling of a fixed dropdown value.
pub fn option_value(value: &str) -> String {
    if let Some(option) = menu_option(value) {
        return option.to_string();
    }
    match value {
        "e ^" => "e^".to_string(),
        "10 ^" => "10^".to_string(),
        "any" => "any key".to_string(),
        _ => value.to_string(),
    }
}
